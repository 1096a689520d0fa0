use iced_traceplot::TracePlot;

const CURVES: usize = 50;
const SAMPLES: usize = 2000;

fn main() -> iced::Result {
    tracing_subscriber::fmt::init();

    // Curve i: amplitude i/10, phase i/10, ten radians long.
    let rows: Vec<Vec<f64>> = (0..CURVES)
        .map(|i| {
            let offset = i as f64 / 10.0;
            (0..SAMPLES)
                .map(|k| {
                    let t = offset + 10.0 * k as f64 / (SAMPLES - 1) as f64;
                    offset * t.sin()
                })
                .collect()
        })
        .collect();

    TracePlot::builder(rows)
        .with_title("sine waves")
        .build()
        .expect("valid curves")
        .run()
}
