use ariadne::{Config, Label, Report, ReportKind, Source};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MorseError>;

#[derive(Debug, Error)]
pub enum MorseError {
    /// Words-per-minute must be positive; the dit length is `1.2 / wpm`.
    #[error("invalid words-per-minute rate: {0}")]
    InvalidWpm(u32),
    #[error("invalid audio config: {0}")]
    InvalidConfig(String),
    /// A character the synthesizer does not understand. `pos` is a char index.
    #[error("unexpected character '{ch}' at pos {pos} in Morse input")]
    MalformedMorse { ch: char, pos: usize },
    #[error("no Morse code to play")]
    EmptyMorse,
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("settings JSON error: {0}")]
    Settings(#[from] serde_json::Error),
    #[error("a playback session is already active")]
    AlreadyPlaying,
    #[error("playback failed: {0}")]
    Playback(String),
}

impl MorseError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        MorseError::Io {
            path: path.into(),
            source,
        }
    }

    /// Render a diagnostic for this error against the Morse string that
    /// produced it. Malformed input gets the offending character underlined.
    pub fn report(&self, morse: &str) -> String {
        let MorseError::MalformedMorse { ch, pos } = self else {
            return self.to_string();
        };

        // ariadne spans are char offsets, which is what the synthesizer reports.
        let span = *pos..*pos + 1;
        let mut out = Vec::new();
        let written = Report::build(ReportKind::Error, ("morse", span.clone()))
            .with_config(Config::default().with_color(false))
            .with_message(self.to_string())
            .with_label(
                Label::new(("morse", span))
                    .with_message(format!("'{ch}' is not a dot, dash, space or '/'")),
            )
            .finish()
            .write(("morse", Source::from(morse)), &mut out);

        match written {
            Ok(()) => String::from_utf8_lossy(&out).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_position() {
        let err = MorseError::MalformedMorse { ch: 'x', pos: 4 };
        assert_eq!(err.to_string(), "unexpected character 'x' at pos 4 in Morse input");
    }

    #[test]
    fn report_underlines_malformed_char() {
        let morse = "... x ---";
        let err = MorseError::MalformedMorse { ch: 'x', pos: 4 };
        let report = err.report(morse);
        assert!(report.contains("... x ---"), "Report should quote the source:\n{report}");
        assert!(report.contains("is not a dot"), "Report should carry the label:\n{report}");
    }

    #[test]
    fn report_falls_back_to_display() {
        let err = MorseError::InvalidWpm(0);
        assert_eq!(err.report("..."), "invalid words-per-minute rate: 0");
    }

    #[test]
    fn io_error_carries_path() {
        let err = MorseError::io("/nope/out.wav", io::Error::from(io::ErrorKind::NotFound));
        assert!(err.to_string().contains("/nope/out.wav"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
