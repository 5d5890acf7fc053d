use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;

/// The output regions both shells render into: a markdown area that is
/// re-rendered wholesale while streaming, plain text, an image slot, and
/// the three banner levels.
pub trait Surface {
    fn markdown(&mut self, content: &str);
    fn text(&mut self, content: &str);
    fn image(&mut self, path: &str);
    fn info(&mut self, message: &str);
    fn warning(&mut self, message: &str);
    fn error(&mut self, message: &str);

    /// Marks the end of one request/response cycle.
    fn finish(&mut self) {}
}

pub struct TerminalSurface {
    // logical lines of the markdown frame currently on screen; wrapped
    // lines are not tracked, long answers may over-clear
    rendered_lines: usize,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self { rendered_lines: 0 }
    }
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for TerminalSurface {
    fn markdown(&mut self, content: &str) {
        // Full-buffer re-render: wipe the previous frame and print the
        // whole accumulated answer again.
        if self.rendered_lines > 0 {
            print!("\x1b[{}A\x1b[0J", self.rendered_lines);
        }
        println!("{}", content);
        self.rendered_lines = content.lines().count().max(1);
        io::stdout().flush().ok();
    }

    fn text(&mut self, content: &str) {
        self.rendered_lines = 0;
        println!("{}", content);
    }

    fn image(&mut self, path: &str) {
        self.rendered_lines = 0;
        match image::image_dimensions(path) {
            Ok((width, height)) => {
                println!("🖼  {} ({}x{})", path.bright_yellow(), width, height);
            }
            Err(e) => {
                log::debug!("Could not probe image {}: {}", path, e);
                println!("🖼  {}", path.bright_yellow());
            }
        }
    }

    fn info(&mut self, message: &str) {
        self.rendered_lines = 0;
        println!("{}", message.cyan());
    }

    fn warning(&mut self, message: &str) {
        self.rendered_lines = 0;
        println!("{}", format!("⚠️  {}", message).yellow());
    }

    fn error(&mut self, message: &str) {
        self.rendered_lines = 0;
        println!("{}", format!("❌ {}", message).red());
    }

    fn finish(&mut self) {
        self.rendered_lines = 0;
        println!();
    }
}

pub(crate) fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Surface;

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum SurfaceEvent {
        Markdown(String),
        Text(String),
        Image(String),
        Info(String),
        Warning(String),
        Error(String),
    }

    /// Captures everything a shell renders, in order.
    #[derive(Default)]
    pub(crate) struct RecordingSurface {
        pub events: Vec<SurfaceEvent>,
    }

    impl RecordingSurface {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn errors(&self) -> Vec<&str> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    SurfaceEvent::Error(message) => Some(message.as_str()),
                    _ => None,
                })
                .collect()
        }

        pub fn warnings(&self) -> Vec<&str> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    SurfaceEvent::Warning(message) => Some(message.as_str()),
                    _ => None,
                })
                .collect()
        }
    }

    impl Surface for RecordingSurface {
        fn markdown(&mut self, content: &str) {
            self.events.push(SurfaceEvent::Markdown(content.to_string()));
        }

        fn text(&mut self, content: &str) {
            self.events.push(SurfaceEvent::Text(content.to_string()));
        }

        fn image(&mut self, path: &str) {
            self.events.push(SurfaceEvent::Image(path.to_string()));
        }

        fn info(&mut self, message: &str) {
            self.events.push(SurfaceEvent::Info(message.to_string()));
        }

        fn warning(&mut self, message: &str) {
            self.events.push(SurfaceEvent::Warning(message.to_string()));
        }

        fn error(&mut self, message: &str) {
            self.events.push(SurfaceEvent::Error(message.to_string()));
        }
    }
}
