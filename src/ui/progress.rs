use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::icons::{CHECK, CROSS};

/// Terminal UI for a running generation, rendered via `indicatif`.
///
/// A single spinner shows the operation label and the latest progress
/// message. In verbose mode every progress message is also printed as a
/// dim indented line above the spinner.
pub struct GenerationUI {
    multi: MultiProgress,
    spinner: ProgressBar,
    verbose: bool,
    label: Mutex<String>,
    started: Mutex<Option<Instant>>,
}

impl GenerationUI {
    pub fn new(verbose: bool) -> Self {
        let multi = MultiProgress::new();
        let spinner_style = ProgressStyle::default_spinner()
            .template("{prefix:.bold.dim} {spinner} {msg}")
            .expect("progress bar template is a valid static string");

        let spinner = multi.add(ProgressBar::new_spinner());
        spinner.set_style(spinner_style);

        Self {
            multi,
            spinner,
            verbose,
            label: Mutex::new(String::new()),
            started: Mutex::new(None),
        }
    }

    /// Print a line via `MultiProgress`, falling back to `eprintln!` if the
    /// rich UI fails.
    fn print_line(&self, msg: impl AsRef<str>) {
        if self.multi.println(msg.as_ref()).is_err() {
            eprintln!("{}", msg.as_ref());
        }
    }

    fn label(&self) -> String {
        self.label.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Start the spinner for an operation such as `"Generating copy"`.
    pub fn start(&self, label: &str) {
        if let Ok(mut l) = self.label.lock() {
            *l = label.to_string();
        }
        if let Ok(mut s) = self.started.lock() {
            *s = Some(Instant::now());
        }
        self.spinner.set_prefix(label.to_string());
        self.spinner.set_message(style("(starting...)").dim().to_string());
        self.spinner.enable_steady_tick(Duration::from_millis(100));
    }

    /// Show the latest progress message.
    pub fn log_step(&self, msg: &str) {
        self.spinner
            .set_message(style(format!("({})", msg)).dim().to_string());
        if self.verbose {
            self.print_line(format!("    {} {}", style("→").dim(), style(msg).dim()));
        }
    }

    /// Stop the spinner and print a one-line summary with elapsed time.
    pub fn finish(&self, success: bool) {
        let elapsed = self
            .started
            .lock()
            .ok()
            .and_then(|s| *s)
            .map(|s| s.elapsed())
            .unwrap_or_default();
        let label = self.label();
        self.spinner.finish_and_clear();
        let secs = elapsed.as_secs_f64();
        if success {
            self.print_line(format!(
                "{}{} {}",
                CHECK,
                label,
                style(format!("({:.1}s)", secs)).dim()
            ));
        } else {
            self.print_line(format!(
                "{}{} {}",
                CROSS,
                style(label).red(),
                style(format!("({:.1}s)", secs)).dim()
            ));
        }
    }
}
