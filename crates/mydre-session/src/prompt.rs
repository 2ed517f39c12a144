//! The one-at-a-time PIN prompt.
//!
//! Tracks which file a PIN is being collected for. Opening a second
//! prompt while one is pending is an error; the original UI silently
//! retargeted the open dialog, which could send a PIN to the wrong file.

use mydre_core::validation::validate_pin;
use mydre_core::AppError;

#[derive(Debug, Default)]
pub struct PinPrompt {
    pending: Option<String>,
}

impl PinPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the prompt for a file.
    pub fn open(&mut self, file_name: &str) -> Result<(), AppError> {
        if let Some(current) = &self.pending {
            return Err(AppError::PromptBusy(current.clone()));
        }
        self.pending = Some(file_name.to_string());
        Ok(())
    }

    /// Validate the PIN and hand back the (file, pin) pair, closing the
    /// prompt. A too-short PIN leaves the prompt open for another try.
    pub fn confirm(&mut self, pin: &str) -> Result<(String, String), AppError> {
        let target = self
            .pending
            .as_ref()
            .ok_or_else(|| AppError::InvalidInput("No PIN prompt is open".to_string()))?
            .clone();
        validate_pin(pin)?;
        self.pending = None;
        Ok((target, pin.to_string()))
    }

    /// Close without side effects. Returns the abandoned target, if any.
    pub fn cancel(&mut self) -> Option<String> {
        self.pending.take()
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    pub fn target(&self) -> Option<&str> {
        self.pending.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_open_is_rejected() {
        let mut prompt = PinPrompt::new();
        prompt.open("a.mydre").unwrap();
        let err = prompt.open("b.mydre").unwrap_err();
        assert!(matches!(err, AppError::PromptBusy(name) if name == "a.mydre"));
        assert_eq!(prompt.target(), Some("a.mydre"));
    }

    #[test]
    fn confirm_clears_pending() {
        let mut prompt = PinPrompt::new();
        prompt.open("a.mydre").unwrap();
        let (file, pin) = prompt.confirm("123456").unwrap();
        assert_eq!(file, "a.mydre");
        assert_eq!(pin, "123456");
        assert!(!prompt.is_open());
    }

    #[test]
    fn short_pin_keeps_prompt_open() {
        let mut prompt = PinPrompt::new();
        prompt.open("a.mydre").unwrap();
        assert!(prompt.confirm("123").is_err());
        assert!(prompt.is_open());
    }

    #[test]
    fn cancel_has_no_side_effects() {
        let mut prompt = PinPrompt::new();
        prompt.open("a.mydre").unwrap();
        assert_eq!(prompt.cancel().as_deref(), Some("a.mydre"));
        assert!(!prompt.is_open());
        assert!(prompt.confirm("123456").is_err());
    }
}
