use serde::{Deserialize, Serialize};

/// Canonical form of one input row.
///
/// Identity is the row position inside its batch; the struct itself carries no id.
/// Absent columns are empty strings, never `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub scenario: String,
    pub description: String,
    pub preconditions: String,
    pub actions: String,
    pub technique: String,
    pub priority: String,
    pub expected_result: String,
}

/// Canonical field identifiers, in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestCaseField {
    Scenario,
    Description,
    Preconditions,
    Actions,
    Technique,
    Priority,
    ExpectedResult,
}

impl TestCaseField {
    pub const ALL: [TestCaseField; 7] = [
        TestCaseField::Scenario,
        TestCaseField::Description,
        TestCaseField::Preconditions,
        TestCaseField::Actions,
        TestCaseField::Technique,
        TestCaseField::Priority,
        TestCaseField::ExpectedResult,
    ];

    /// Key used when a case is serialized.
    #[cfg(test)]
    pub fn key(&self) -> &'static str {
        match self {
            TestCaseField::Scenario => "scenario",
            TestCaseField::Description => "description",
            TestCaseField::Preconditions => "preconditions",
            TestCaseField::Actions => "actions",
            TestCaseField::Technique => "technique",
            TestCaseField::Priority => "priority",
            TestCaseField::ExpectedResult => "expectedResult",
        }
    }

    /// Column name as it appears in sheets and in validation messages.
    pub fn column_label(&self) -> &'static str {
        match self {
            TestCaseField::Scenario => "escenario",
            TestCaseField::Description => "descripcion",
            TestCaseField::Preconditions => "precondiciones",
            TestCaseField::Actions => "acciones",
            TestCaseField::Technique => "tecnica",
            TestCaseField::Priority => "prioridad",
            TestCaseField::ExpectedResult => "resultado_esperado",
        }
    }
}

impl TestCase {
    pub fn get(&self, field: TestCaseField) -> &str {
        match field {
            TestCaseField::Scenario => &self.scenario,
            TestCaseField::Description => &self.description,
            TestCaseField::Preconditions => &self.preconditions,
            TestCaseField::Actions => &self.actions,
            TestCaseField::Technique => &self.technique,
            TestCaseField::Priority => &self.priority,
            TestCaseField::ExpectedResult => &self.expected_result,
        }
    }

    pub fn set(&mut self, field: TestCaseField, value: String) {
        match field {
            TestCaseField::Scenario => self.scenario = value,
            TestCaseField::Description => self.description = value,
            TestCaseField::Preconditions => self.preconditions = value,
            TestCaseField::Actions => self.actions = value,
            TestCaseField::Technique => self.technique = value,
            TestCaseField::Priority => self.priority = value,
            TestCaseField::ExpectedResult => self.expected_result = value,
        }
    }

    /// `(key, value)` pairs using the serialized key names.
    #[cfg(test)]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        TestCaseField::ALL
            .iter()
            .map(|field| (field.key(), self.get(*field).to_string()))
            .collect()
    }
}
