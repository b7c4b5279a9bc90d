use crate::error::EngineError;
use crate::types::{Cell, CHAIN_BASE, CRUSH_THRESHOLD, DEFAULT_COLOR};

/// Engine-level rule constants.
///
/// The defaults are the standard rules; changing them never alters how the
/// chain loop works, only its thresholds and payout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rules {
    /// Minimum landed cluster size auto-crushed during a chain.
    pub crush_threshold: usize,
    /// Base of the exponential Power multiplier.
    pub chain_base: f64,
    /// Color used when the board holds no colors.
    pub default_color: Cell,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            crush_threshold: CRUSH_THRESHOLD,
            chain_base: CHAIN_BASE,
            default_color: DEFAULT_COLOR,
        }
    }
}

impl Rules {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.crush_threshold < 2 {
            return Err(EngineError::InvalidRules(
                "crush_threshold must be >= 2".into(),
            ));
        }
        if !self.chain_base.is_finite() || self.chain_base < 1.0 {
            return Err(EngineError::InvalidRules(
                "chain_base must be a finite number >= 1.0".into(),
            ));
        }
        if self.default_color == 0 {
            return Err(EngineError::InvalidRules(
                "default_color must be a color id (> 0)".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_are_valid() {
        assert!(Rules::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_rules() {
        let low = Rules {
            crush_threshold: 1,
            ..Rules::default()
        };
        assert!(low.validate().is_err());

        let nan = Rules {
            chain_base: f64::NAN,
            ..Rules::default()
        };
        assert!(nan.validate().is_err());

        let empty = Rules {
            default_color: 0,
            ..Rules::default()
        };
        assert_eq!(
            empty.validate(),
            Err(EngineError::InvalidRules(
                "default_color must be a color id (> 0)".into()
            ))
        );
    }
}
