/// Diagnostic channel for failures that must not abort a scrape.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, context: &str, err: &dyn std::error::Error);
}

/// Reports errors through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, context: &str, err: &dyn std::error::Error) {
        log::error!(target: "stats collector", "{context}: {err}");
    }
}

pub trait ResultReportExt<T> {
    /// Turns the result into an `Option`, handing the error to `reporter`.
    fn ok_report(self, reporter: &dyn ErrorReporter, context: &str) -> Option<T>;
}

impl<T, E> ResultReportExt<T> for std::result::Result<T, E>
where
    E: std::error::Error,
{
    fn ok_report(self, reporter: &dyn ErrorReporter, context: &str) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                reporter.report(context, &err);
                None
            }
        }
    }
}
