use serde::{Deserialize, Serialize};

use crate::dom::dom_model::NodeId;
use crate::element::selector::SelectorSet;

/// Semantic type of a fillable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Email,
    Password,
    Search,
    Url,
    Phone,
    Number,
    Date,
    Time,
    Name,
    Username,
    Address,
    Age,
    Title,
    Textarea,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Password => "password",
            FieldType::Search => "search",
            FieldType::Url => "url",
            FieldType::Phone => "phone",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::Name => "name",
            FieldType::Username => "username",
            FieldType::Address => "address",
            FieldType::Age => "age",
            FieldType::Title => "title",
            FieldType::Textarea => "textarea",
        }
    }

    /// Prompt shown when asking an operator for a value.
    pub fn prompt(&self, display_name: &str) -> String {
        let ask = match self {
            FieldType::Search => "Enter search term",
            FieldType::Email => "Enter email address",
            FieldType::Password => "Enter password",
            FieldType::Url => "Enter URL",
            FieldType::Textarea => "Enter text",
            FieldType::Phone => "Enter phone number",
            FieldType::Number => "Enter number",
            FieldType::Date => {
                return format!("Enter date for {} (YYYY-MM-DD, or press Enter to skip): ", display_name);
            }
            FieldType::Time => {
                return format!("Enter time for {} (HH:MM, or press Enter to skip): ", display_name);
            }
            FieldType::Name => "Enter name",
            FieldType::Username => "Enter username",
            FieldType::Address => "Enter address",
            FieldType::Age => "Enter age",
            FieldType::Title => "Enter title",
            FieldType::Text => "Enter value",
        };
        format!("{} for {} (or press Enter to skip): ", ask, display_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFieldRecord {
    pub node: NodeId,
    pub selectors: SelectorSet,
    pub field_type: FieldType,
    pub display_name: String,
    pub placeholder: String,
    pub name: String,
    pub id: String,
    pub class: String,
    /// Raw `type` attribute, `text` when absent.
    pub input_type: String,
    pub current_value: String,
}

impl InputFieldRecord {
    /// Display name qualified by `name`, falling back to `id`.
    pub fn description(&self) -> String {
        if !self.name.is_empty() {
            format!("{} (name: {})", self.display_name, self.name)
        } else if !self.id.is_empty() {
            format!("{} (id: {})", self.display_name, self.id)
        } else {
            self.display_name.clone()
        }
    }
}
