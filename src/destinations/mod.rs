//! Destination implementations

pub mod capture;
#[cfg(feature = "console")]
pub mod console;
pub mod stdout;

pub use capture::CaptureDestination;
#[cfg(feature = "console")]
pub use console::ConsoleDestination;
pub use stdout::StdoutDestination;

pub use crate::core::Destination;

/// Built-in destination by name; unknown names get JSON lines on stdout
pub fn named(name: &str) -> Box<dyn Destination> {
    match name {
        "capture" => Box::new(CaptureDestination::new()),
        #[cfg(feature = "console")]
        "console" => Box::new(ConsoleDestination::new()),
        #[cfg(not(feature = "console"))]
        "console" => {
            eprintln!("[LOGGER WARNING] console destination not compiled in, using stdout");
            Box::new(StdoutDestination::new())
        }
        _ => Box::new(StdoutDestination::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_destinations() {
        assert_eq!(named("capture").name(), "capture");
        assert_eq!(named("json").name(), "stdout");
        assert_eq!(named("stdout").name(), "stdout");
        assert_eq!(named("unknown").name(), "stdout");
    }

    #[cfg(feature = "console")]
    #[test]
    fn test_named_console() {
        assert_eq!(named("console").name(), "console");
    }
}
