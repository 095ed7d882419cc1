use chrono::NaiveDate;

use crate::config::LabelConfig;
use crate::dates::{Age, age_on, format_date, is_birthday};
use crate::ir::Person;

/// Inputs that make labels and birthday highlights depend on "now". The
/// reference date is explicit so identical inputs render identically.
#[derive(Debug, Clone, Copy)]
pub struct LabelContext<'a> {
    pub config: &'a LabelConfig,
    /// Without a reference date, ages and birthday highlights are skipped.
    pub today: Option<NaiveDate>,
}

impl<'a> LabelContext<'a> {
    pub fn new(config: &'a LabelConfig, today: Option<NaiveDate>) -> Self {
        Self { config, today }
    }

    pub fn label_for(&self, person: &Person) -> String {
        let mut label = format!(
            "{}\n{}",
            person.name,
            format_date(person.birth_date, &self.config.date_format)
        );
        if self.config.show_age
            && let Some(today) = self.today
        {
            label.push('\n');
            label.push_str(&self.format_age(age_on(person.birth_date, today)));
        }
        label
    }

    pub fn birthday_today(&self, person: &Person) -> bool {
        self.today
            .is_some_and(|today| is_birthday(person.birth_date, today))
    }

    fn format_age(&self, age: Age) -> String {
        if age.months > 0 {
            format!(
                "{}{} {}{}",
                age.years, self.config.years_suffix, age.months, self.config.months_suffix
            )
        } else {
            format!("{}{}", age.years, self.config.years_suffix)
        }
    }
}
