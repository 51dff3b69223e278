use rand::Rng;
use std::time::Duration;
use thiserror::Error;

pub const PAYMENT_DELAY: Duration = Duration::from_millis(1200);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Pick a date for your session.")]
    MissingDate,
    #[error("Pick a time slot for your session.")]
    MissingTime,
    #[error("This step is not available from here.")]
    WrongStep,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardState {
    SelectDateTime,
    Review,
    Payment,
    Complete { access_code: String },
}

/// The four-step booking flow for one gym. Transitions only move forward;
/// a finished wizard is discarded rather than rewound.
#[derive(Debug, Clone)]
pub struct BookingWizard {
    pub gym_id: String,
    pub gym_name: String,
    pub session_date: String,
    pub session_time: String,
    state: WizardState,
}

impl BookingWizard {
    pub fn new(gym_id: &str, gym_name: &str) -> Self {
        BookingWizard {
            gym_id: gym_id.to_string(),
            gym_name: gym_name.to_string(),
            session_date: String::new(),
            session_time: String::new(),
            state: WizardState::SelectDateTime,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    /// SelectDateTime → Review. Both fields must be filled in.
    pub fn select(&mut self, date: &str, time: &str) -> Result<(), ValidationError> {
        if self.state != WizardState::SelectDateTime {
            return Err(ValidationError::WrongStep);
        }
        let date = date.trim();
        let time = time.trim();
        if date.is_empty() {
            return Err(ValidationError::MissingDate);
        }
        if time.is_empty() {
            return Err(ValidationError::MissingTime);
        }
        self.session_date = date.to_string();
        self.session_time = time.to_string();
        self.state = WizardState::Review;
        Ok(())
    }

    /// Review → Payment.
    pub fn confirm(&mut self) -> Result<(), ValidationError> {
        if self.state != WizardState::Review {
            return Err(ValidationError::WrongStep);
        }
        self.state = WizardState::Payment;
        Ok(())
    }

    /// Payment → Complete. The caller simulates the payment delay first;
    /// completion mints the one-time access code.
    pub fn complete_payment(&mut self) -> Result<String, ValidationError> {
        if self.state != WizardState::Payment {
            return Err(ValidationError::WrongStep);
        }
        let code = generate_access_code();
        self.state = WizardState::Complete {
            access_code: code.clone(),
        };
        Ok(code)
    }
}

/// Uppercase alphanumeric one-time code, 6 to 8 characters. Shown once to
/// the user for in-person redemption; deliberately never stored.
pub fn generate_access_code() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::thread_rng();
    let len = rng.gen_range(6..=8);
    (0..len)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}
