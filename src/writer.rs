use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;

use crate::record::VacancyRecord;

/// `Keuzedeel Solliciteren <nr> <name>.md`, with characters that cannot
/// appear in a file name replaced by `-`.
pub fn output_filename(student_nr: &str, full_name: &str) -> String {
    let stem = format!("Keuzedeel Solliciteren {} {}", student_nr.trim(), full_name.trim());
    let safe: String = stem
        .chars()
        .map(|c| {
            if c.is_control() || r#"/\:*?"<>|"#.contains(c) {
                '-'
            } else {
                c
            }
        })
        .collect();
    format!("{}.md", safe.trim())
}

pub fn render_header(student_nr: &str, full_name: &str, created: NaiveDate) -> String {
    format!(
        r##"# Keuzedeel Solliciteren

**Student:** {} ({})
**Aangemaakt op:** {}

"##,
        full_name.trim(),
        student_nr.trim(),
        created.format("%d-%m-%Y"),
    )
}

/// One vacancy: six numbered fields, then the reflection prompts the
/// student fills in by hand, closed by a separator.
pub fn render_section(slot: usize, record: &VacancyRecord) -> String {
    format!(
        r##"## Vacature {slot}: {title}

1. **URL:** {url}

2. **Vacature tekst:**
{text}

3. **Contactpersoon:** {person}

4. **Telefoonnummer:** {phone}

5. **E-mailadres:** {email}

6. **Bezoekadres:** {address}

### 🖋️ Persoonlijke Reflectie (Zelf invullen):
**a) Passend bij opleiding/afstudeerrichting:**
*(Vul hier in waarom dit past bij jouw studie...)*

**b) Erkenningscode:** Het bedrijf heeft code: `{code}`.

**c) Inhoud/Leerdoelen:**
*(Vul hier in waarom dit de juiste ontwikkelrichting is voor jou...)*

---

"##,
        slot = slot,
        title = record.title,
        url = record.url,
        text = record.text,
        person = record.person,
        phone = record.phone,
        email = record.email,
        address = record.address,
        code = record.code,
    )
}

/// The document being built during a run. Created once (truncating any
/// previous run's file), then only ever appended to.
pub struct MarkdownWriter {
    path: PathBuf,
    sections: usize,
}

impl MarkdownWriter {
    pub fn create(path: impl Into<PathBuf>, header: &str) -> anyhow::Result<Self> {
        let path = path.into();
        fs::write(&path, header).with_context(|| format!("cannot create {}", path.display()))?;
        Ok(Self { path, sections: 0 })
    }

    pub fn append(&mut self, slot: usize, record: &VacancyRecord) -> anyhow::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("cannot open {} for appending", self.path.display()))?;
        file.write_all(render_section(slot, record).as_bytes())
            .with_context(|| format!("cannot write vacancy {slot} to {}", self.path.display()))?;
        self.sections += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Vacancy sections appended so far.
    pub fn sections(&self) -> usize {
        self.sections
    }
}
