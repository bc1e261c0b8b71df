use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use phaselab::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const PHASE_TICK: Duration = Duration::from_millis(100);

/// Bar state shared between the callback and its owner.
///
/// A phase shows as a spinner labelled with the phase name. Batches inside a
/// phase (one unit per input file or map) switch the same line to a counted
/// bar whose message is the file most recently finished.
struct BatchLine {
    bar: ProgressBar,
    phase: &'static str,
    last_item: Option<String>,
}

impl BatchLine {
    fn hidden() -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
        bar.set_style(phase_style());
        bar.finish_and_clear();
        Self {
            bar,
            phase: "",
            last_item: None,
        }
    }

    fn apply(&mut self, event: Progress) {
        match event {
            Progress::PhaseStart { name } => self.begin_phase(name),
            Progress::PhaseFinish => self.end_phase(),
            Progress::TaskStart { total } => self.begin_batch(total),
            Progress::TaskIncrement { item } => self.file_done(item),
            Progress::TaskFinish => self.end_batch(),
            Progress::Message(text) => self.note(text),
        }
    }

    fn begin_phase(&mut self, name: &'static str) {
        self.phase = name;
        self.last_item = None;
        self.bar.reset();
        self.bar.set_length(0);
        self.bar.set_style(phase_style());
        self.bar.set_prefix(name);
        self.bar.set_message("");
        self.bar.enable_steady_tick(PHASE_TICK);
    }

    fn end_phase(&mut self) {
        self.bar.disable_steady_tick();
        self.bar.finish_with_message(format!("{} done", self.phase));
    }

    fn begin_batch(&mut self, total: u64) {
        self.last_item = None;
        self.bar.disable_steady_tick();
        self.bar.reset();
        self.bar.set_style(batch_style());
        self.bar.set_prefix(self.phase);
        self.bar.set_length(total);
        self.bar.set_message("");
    }

    fn file_done(&mut self, item: String) {
        self.bar.inc(1);
        self.bar.set_message(item.clone());
        self.last_item = Some(item);
    }

    fn end_batch(&mut self) {
        let total = self.bar.length().unwrap_or(0);
        self.bar.set_position(total);
        let noun = if total == 1 { "file" } else { "files" };
        self.bar.finish_with_message(format!("{total} {noun}"));
    }

    fn note(&self, text: String) {
        if self.bar.is_hidden() || self.bar.is_finished() {
            eprintln!("  {text}");
        } else {
            self.bar.println(format!("  {text}"));
        }
    }
}

fn phase_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {prefix:.bold} {msg}")
        .expect("static phase template")
}

fn batch_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.green} {prefix:.bold} [{bar:30.cyan/blue}] {pos}/{len} · {msg} ({elapsed})",
    )
    .expect("static batch template")
    .progress_chars("=> ")
}

/// Renders library progress events on stderr for per-file batch runs.
#[derive(Clone)]
pub struct CliProgressHandler {
    line: Arc<Mutex<BatchLine>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self {
            line: Arc::new(Mutex::new(BatchLine::hidden())),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let line = Arc::clone(&self.line);
        Box::new(move |event: Progress| match line.lock() {
            Ok(mut line) => line.apply(event),
            Err(_) => warn!("Progress display lock was poisoned; dropping a progress event."),
        })
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn send_all(handler: &CliProgressHandler, events: Vec<Progress>) {
        let callback = handler.get_callback();
        for event in events {
            callback(event);
        }
    }

    #[test]
    fn new_handler_starts_idle() {
        let handler = CliProgressHandler::new();
        let line = handler.line.lock().unwrap();
        assert!(line.bar.is_finished());
        assert_eq!(line.phase, "");
        assert!(line.last_item.is_none());
    }

    #[test]
    fn phase_name_labels_the_line_and_its_completion() {
        let handler = CliProgressHandler::new();
        send_all(&handler, vec![Progress::PhaseStart { name: "Reading Positions" }]);
        {
            let line = handler.line.lock().unwrap();
            assert_eq!(line.bar.prefix(), "Reading Positions");
            assert!(!line.bar.is_finished());
        }

        send_all(&handler, vec![Progress::PhaseFinish]);
        let line = handler.line.lock().unwrap();
        assert_eq!(line.bar.message(), "Reading Positions done");
    }

    #[test]
    fn batch_counts_files_and_remembers_the_latest() {
        let handler = CliProgressHandler::new();
        send_all(
            &handler,
            vec![
                Progress::PhaseStart { name: "Fitting" },
                Progress::TaskStart { total: 3 },
                Progress::TaskIncrement {
                    item: "Ti_Ti".to_string(),
                },
                Progress::TaskIncrement {
                    item: "Ti_Nb".to_string(),
                },
            ],
        );
        {
            let line = handler.line.lock().unwrap();
            assert_eq!(line.bar.length(), Some(3));
            assert_eq!(line.bar.position(), 2);
            assert_eq!(line.bar.prefix(), "Fitting");
            assert_eq!(line.last_item.as_deref(), Some("Ti_Nb"));
        }

        // A batch that skipped files still ends full.
        send_all(&handler, vec![Progress::TaskFinish]);
        let line = handler.line.lock().unwrap();
        assert!(line.bar.is_finished());
        assert_eq!(line.bar.position(), 3);
        assert_eq!(line.bar.message(), "3 files");
    }

    #[test]
    fn single_file_batch_uses_singular_summary() {
        let handler = CliProgressHandler::new();
        send_all(
            &handler,
            vec![
                Progress::PhaseStart {
                    name: "Rendering Maps",
                },
                Progress::TaskStart { total: 1 },
                Progress::TaskIncrement {
                    item: "S1".to_string(),
                },
                Progress::TaskFinish,
            ],
        );
        let line = handler.line.lock().unwrap();
        assert_eq!(line.bar.message(), "1 file");
    }

    #[test]
    fn new_phase_forgets_the_previous_batch() {
        let handler = CliProgressHandler::new();
        send_all(
            &handler,
            vec![
                Progress::PhaseStart { name: "Fitting" },
                Progress::TaskStart { total: 2 },
                Progress::TaskIncrement {
                    item: "a".to_string(),
                },
                Progress::TaskFinish,
                Progress::PhaseFinish,
                Progress::PhaseStart { name: "Plotting" },
            ],
        );
        let line = handler.line.lock().unwrap();
        assert_eq!(line.phase, "Plotting");
        assert_eq!(line.bar.position(), 0);
        assert!(line.last_item.is_none());
    }

    #[test]
    fn events_from_another_thread_reach_the_shared_line() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        thread::spawn(move || {
            callback(Progress::PhaseStart {
                name: "Degree of Collapse",
            });
            callback(Progress::Message("2 atoms out of band".to_string()));
            callback(Progress::PhaseFinish);
        })
        .join()
        .unwrap();

        let line = handler.line.lock().unwrap();
        assert!(line.bar.is_finished());
        assert_eq!(line.bar.message(), "Degree of Collapse done");
    }
}
