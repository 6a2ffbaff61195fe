//! Extractive question answering used as the field extractor's fallback.

#[cfg(feature = "native")]
mod bert;

#[cfg(feature = "native")]
pub use bert::BertQa;

use std::sync::OnceLock;

use tracing::{info, warn};

use crate::error::QaError;

/// A span answer and its confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    /// Probability-like score in `[0, 1]`.
    pub score: f32,
}

/// Answers a natural-language question from a context passage.
pub trait QuestionAnswerer: Send + Sync {
    fn answer(&self, question: &str, context: &str) -> Result<Answer, QaError>;
}

type Initializer = Box<dyn Fn() -> Result<Box<dyn QuestionAnswerer>, QaError> + Send + Sync>;

/// Question answerer that loads its model on first use.
///
/// The initializer runs at most once. A failed initialization is remembered
/// and every later call reports [`QaError::Unavailable`] without retrying.
pub struct LazyAnswerer {
    init: Initializer,
    cell: OnceLock<Option<Box<dyn QuestionAnswerer>>>,
}

impl LazyAnswerer {
    pub fn new<F>(init: F) -> Self
    where
        F: Fn() -> Result<Box<dyn QuestionAnswerer>, QaError> + Send + Sync + 'static,
    {
        Self {
            init: Box::new(init),
            cell: OnceLock::new(),
        }
    }

    /// An answerer that is never available.
    pub fn unavailable() -> Self {
        Self::new(|| Err(QaError::Unavailable))
    }

    /// Whether the model loaded, initializing it if this is the first call.
    pub fn is_available(&self) -> bool {
        self.get().is_some()
    }

    fn get(&self) -> Option<&dyn QuestionAnswerer> {
        self.cell
            .get_or_init(|| match (self.init)() {
                Ok(answerer) => {
                    info!("Question answering model loaded");
                    Some(answerer)
                }
                Err(e) => {
                    warn!("Question answering unavailable: {}", e);
                    None
                }
            })
            .as_deref()
    }
}

impl QuestionAnswerer for LazyAnswerer {
    fn answer(&self, question: &str, context: &str) -> Result<Answer, QaError> {
        self.get().ok_or(QaError::Unavailable)?.answer(question, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Echo;

    impl QuestionAnswerer for Echo {
        fn answer(&self, _question: &str, context: &str) -> Result<Answer, QaError> {
            Ok(Answer {
                text: context.to_string(),
                score: 0.9,
            })
        }
    }

    #[test]
    fn test_initializes_once() {
        let inits = Arc::new(AtomicUsize::new(0));
        let counter = inits.clone();
        let lazy = LazyAnswerer::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(Echo) as Box<dyn QuestionAnswerer>)
        });

        assert_eq!(inits.load(Ordering::SeqCst), 0);
        assert_eq!(lazy.answer("q", "ctx").unwrap().text, "ctx");
        lazy.answer("q", "ctx").unwrap();
        assert_eq!(inits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failure_is_cached() {
        let inits = Arc::new(AtomicUsize::new(0));
        let counter = inits.clone();
        let lazy = LazyAnswerer::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(QaError::ModelLoad("missing model".to_string()))
        });

        assert!(matches!(lazy.answer("q", "c"), Err(QaError::Unavailable)));
        assert!(!lazy.is_available());
        assert_eq!(inits.load(Ordering::SeqCst), 1);
    }
}
