//! Add-patient form state

use triagectl_core::{NewPatient, SEVERITY_MAX, SEVERITY_MIN};

/// Field with keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Name,
    Age,
    Severity,
    Checkup,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::Name,
        FormField::Age,
        FormField::Severity,
        FormField::Checkup,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::Age => "Age",
            FormField::Severity => "Severity (1-5)",
            FormField::Checkup => "Checkup",
        }
    }

    fn next(self) -> Self {
        match self {
            FormField::Name => FormField::Age,
            FormField::Age => FormField::Severity,
            FormField::Severity => FormField::Checkup,
            FormField::Checkup => FormField::Name,
        }
    }

    fn prev(self) -> Self {
        match self {
            FormField::Name => FormField::Checkup,
            FormField::Age => FormField::Name,
            FormField::Severity => FormField::Age,
            FormField::Checkup => FormField::Severity,
        }
    }
}

/// Input buffers for a new patient. Defaults: empty name, age 0, severity 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientForm {
    pub name: String,
    /// Digits only
    pub age: String,
    pub severity: i64,
    pub checkup: String,
    pub field: FormField,
}

impl Default for PatientForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            age: String::new(),
            severity: SEVERITY_MIN,
            checkup: String::new(),
            field: FormField::Name,
        }
    }
}

impl PatientForm {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn next_field(&mut self) {
        self.field = self.field.next();
    }

    pub fn prev_field(&mut self) {
        self.field = self.field.prev();
    }

    /// Type a character into the focused field
    pub fn insert(&mut self, c: char) {
        match self.field {
            FormField::Name => self.name.push(c),
            FormField::Checkup => self.checkup.push(c),
            FormField::Age if c.is_ascii_digit() && self.age.len() < 3 => self.age.push(c),
            FormField::Severity => {
                if let Some(d) = c.to_digit(10) {
                    self.severity = i64::from(d).clamp(SEVERITY_MIN, SEVERITY_MAX);
                }
            }
            FormField::Age => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.field {
            FormField::Name => {
                self.name.pop();
            }
            FormField::Age => {
                self.age.pop();
            }
            FormField::Checkup => {
                self.checkup.pop();
            }
            FormField::Severity => {}
        }
    }

    /// Step severity up or down, clamped to 1-5
    pub fn adjust_severity(&mut self, delta: i64) {
        self.severity = (self.severity + delta).clamp(SEVERITY_MIN, SEVERITY_MAX);
    }

    /// Display value for a field
    pub fn value(&self, field: FormField) -> String {
        match field {
            FormField::Name => self.name.clone(),
            FormField::Age => {
                if self.age.is_empty() {
                    "0".to_string()
                } else {
                    self.age.clone()
                }
            }
            FormField::Severity => self.severity.to_string(),
            FormField::Checkup => self.checkup.clone(),
        }
    }

    /// Build the insert payload; a blank name never reaches the store
    pub fn to_new_patient(&self) -> Result<NewPatient, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Name is required".to_string());
        }
        let age = if self.age.is_empty() {
            0
        } else {
            self.age
                .parse()
                .map_err(|_| format!("Invalid age: {}", self.age))?
        };
        Ok(NewPatient::new(name, age, self.severity, self.checkup.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let form = PatientForm::default();
        assert_eq!(form.value(FormField::Age), "0");
        assert_eq!(form.severity, 1);
        assert_eq!(form.field, FormField::Name);
    }

    #[test]
    fn test_field_cycle() {
        let mut form = PatientForm::default();
        for expected in [FormField::Age, FormField::Severity, FormField::Checkup, FormField::Name] {
            form.next_field();
            assert_eq!(form.field, expected);
        }
        form.prev_field();
        assert_eq!(form.field, FormField::Checkup);
    }

    #[test]
    fn test_age_accepts_digits_only() {
        let mut form = PatientForm {
            field: FormField::Age,
            ..Default::default()
        };
        for c in "4x2a7".chars() {
            form.insert(c);
        }
        assert_eq!(form.age, "427");
        form.insert('1');
        assert_eq!(form.age, "427");
        form.backspace();
        assert_eq!(form.age, "42");
    }

    #[test]
    fn test_severity_is_clamped() {
        let mut form = PatientForm {
            field: FormField::Severity,
            ..Default::default()
        };
        form.adjust_severity(-1);
        assert_eq!(form.severity, 1);
        form.insert('9');
        assert_eq!(form.severity, 5);
        form.adjust_severity(1);
        assert_eq!(form.severity, 5);
        form.insert('3');
        assert_eq!(form.severity, 3);
    }

    #[test]
    fn test_blank_name_rejected() {
        let form = PatientForm {
            name: "   ".to_string(),
            ..Default::default()
        };
        assert!(form.to_new_patient().is_err());
    }

    #[test]
    fn test_to_new_patient() {
        let form = PatientForm {
            name: " Juan ".to_string(),
            age: "61".to_string(),
            severity: 4,
            checkup: "cardio".to_string(),
            field: FormField::Checkup,
        };
        assert_eq!(
            form.to_new_patient().unwrap(),
            NewPatient::new("Juan", 61, 4, "cardio")
        );
    }
}
