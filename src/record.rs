/// One vacancy as it ends up in the document. Every field holds either real
/// content or the configured placeholder, never an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VacancyRecord {
    pub url: String,
    pub title: String,
    pub text: String,
    pub person: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub code: String,
}

impl VacancyRecord {
    /// `(name, value)` pairs in document order.
    pub fn fields(&self) -> [(&'static str, &str); 8] {
        [
            ("url", self.url.as_str()),
            ("title", self.title.as_str()),
            ("text", self.text.as_str()),
            ("person", self.person.as_str()),
            ("phone", self.phone.as_str()),
            ("email", self.email.as_str()),
            ("address", self.address.as_str()),
            ("code", self.code.as_str()),
        ]
    }
}
