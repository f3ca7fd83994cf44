use crate::error::CliError;

/// Static PIN check guarding commands that change data.
#[derive(Clone)]
pub struct AdminGate {
    pin: String,
}

impl AdminGate {
    pub fn new(pin: impl Into<String>) -> Self {
        Self { pin: pin.into() }
    }

    pub fn is_valid(&self, pin: &str) -> bool {
        pin.trim() == self.pin
    }

    pub fn verify(&self, pin: Option<&str>) -> Result<(), CliError> {
        match pin {
            Some(pin) if self.is_valid(pin) => Ok(()),
            Some(_) => {
                tracing::warn!("Invalid admin PIN attempt");
                Err(CliError::Unauthorized)
            }
            None => Err(CliError::PinRequired),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_pin() {
        let gate = AdminGate::new("2005");
        assert!(gate.verify(Some("2005")).is_ok());
        assert!(gate.verify(Some(" 2005 ")).is_ok());
        assert!(matches!(gate.verify(Some("1234")), Err(CliError::Unauthorized)));
        assert!(matches!(gate.verify(None), Err(CliError::PinRequired)));
    }
}
