use colored::Colorize;

/// Where user-facing text goes. Components write through this instead of
/// touching the terminal directly.
pub trait OutputSink {
    fn success(&self, line: &str);
    fn warn(&self, line: &str);
    fn error(&self, line: &str);
    fn info(&self, line: &str);
    fn heading(&self, line: &str);
    fn plain(&self, line: &str);
}

/// Colored stdout.
pub struct ConsoleSink;

impl OutputSink for ConsoleSink {
    fn success(&self, line: &str) {
        println!("{}", line.green());
    }

    fn warn(&self, line: &str) {
        println!("{}", line.yellow());
    }

    fn error(&self, line: &str) {
        println!("{}", line.red());
    }

    fn info(&self, line: &str) {
        println!("{}", line.cyan());
    }

    fn heading(&self, line: &str) {
        println!("{}", line.yellow().bold());
    }

    fn plain(&self, line: &str) {
        println!("{}", line);
    }
}
