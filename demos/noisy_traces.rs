//! Embeds a trace plot in a host application with its own key handling.
//!
//! Press `R` to regenerate the traces.
use iced::{Element, Event, Subscription, keyboard};
use iced_traceplot::{PlotUiMessage, TracePlot};
use rand_distr::{Distribution, Normal};

const TRACES: usize = 40;
const SAMPLES: usize = 5000;

fn main() -> iced::Result {
    tracing_subscriber::fmt::init();

    iced::application(App::new, App::update, App::view)
        .title("noisy traces")
        .subscription(App::subscription)
        .run()
}

#[derive(Debug, Clone)]
enum Message {
    KeyEvent(keyboard::Event),
    PlotUi(PlotUiMessage),
}

struct App {
    plot: TracePlot,
}

impl App {
    fn new() -> Self {
        Self { plot: random_plot() }
    }

    fn update(&mut self, message: Message) {
        match message {
            Message::KeyEvent(event) => {
                if let keyboard::Event::KeyPressed { key, .. } = event
                    && key == keyboard::Key::Character("r".into())
                {
                    self.plot = random_plot();
                }
            }
            Message::PlotUi(msg) => self.plot.update(msg),
        }
    }

    fn view(&self) -> Element<'_, Message> {
        self.plot.view().map(Message::PlotUi)
    }

    fn subscription(&self) -> Subscription<Message> {
        iced::event::listen_with(|event, _status, _window| match event {
            Event::Keyboard(event) => Some(Message::KeyEvent(event)),
            _ => None,
        })
    }
}

/// Gaussian random walks, offset so they stack vertically.
fn random_plot() -> TracePlot {
    let mut rng = rand::rng();
    let step = Normal::new(0.0, 0.15).unwrap();

    let rows: Vec<Vec<f64>> = (0..TRACES)
        .map(|i| {
            let mut y = 3.0 * i as f64;
            (0..SAMPLES)
                .map(|_| {
                    y += step.sample(&mut rng);
                    y
                })
                .collect()
        })
        .collect();
    let labels = (0..TRACES).map(|i| format!("trace {i}"));

    TracePlot::builder(rows)
        .with_labels(labels)
        .with_colormap("viridis")
        .with_pick_radius(40)
        .with_pick_max_distance(5.0)
        .build()
        .unwrap()
}
