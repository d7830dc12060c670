use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::Local;
use tracing::{info, warn};

use crate::config::Settings;
use crate::extract::extract;
use crate::fetcher::PageSource;
use crate::writer::{output_filename, render_header, MarkdownWriter};

#[derive(Debug)]
pub struct RunSummary {
    pub path: PathBuf,
    pub added: usize,
}

/// The interactive run: who the student is, then one URL per slot until the
/// slots are full or the student types the stop word.
pub struct Session<'a, P, R, W> {
    settings: &'a Settings,
    source: &'a P,
    input: R,
    output: W,
}

impl<'a, P, R, W> Session<'a, P, R, W>
where
    P: PageSource,
    R: BufRead,
    W: Write,
{
    pub fn new(settings: &'a Settings, source: &'a P, input: R, output: W) -> Self {
        Self {
            settings,
            source,
            input,
            output,
        }
    }

    pub fn run(&mut self) -> anyhow::Result<RunSummary> {
        writeln!(self.output, "--- 🎓 Keuzedeel Solliciteren Automator ---")?;
        let student_nr = self.ask_required("Voer je studentnummer in: ")?;
        let full_name = self.ask_required("Voer je voor- en achternaam in: ")?;

        let path = self
            .settings
            .output_dir
            .join(output_filename(&student_nr, &full_name));
        let header = render_header(&student_nr, &full_name, Local::now().date_naive());
        let mut writer = MarkdownWriter::create(&path, &header)?;
        writeln!(self.output, "\n✅ Bestand wordt aangemaakt: {}", writer.path().display())?;
        info!(path = %path.display(), "output document created");

        let max = self.settings.max_vacancies;
        let prompt = format!(
            "Paste de Stagemarkt URL (of type '{}' om af te sluiten): ",
            self.settings.stop_word
        );
        while writer.sections() < max {
            let slot = writer.sections() + 1;
            writeln!(self.output, "\n--- Vacature {slot} van {max} ---")?;

            let Some(url) = self.ask(&prompt)? else {
                info!(slot, "input closed, stopping");
                break;
            };
            if url.is_empty() {
                continue;
            }
            if url.eq_ignore_ascii_case(&self.settings.stop_word) {
                break;
            }

            self.collect(slot, &url, &mut writer)?;
        }

        let added = writer.sections();
        writeln!(
            self.output,
            "\n🎉 Klaar! Je kunt nu '{}' openen, de reflectievragen beantwoorden en het opslaan als PDF.",
            path.display()
        )?;
        info!(added, path = %path.display(), "run finished");

        Ok(RunSummary { path, added })
    }

    /// Fetch, extract and append one vacancy. A fetch failure leaves the slot
    /// open; only write failures are errors.
    fn collect(&mut self, slot: usize, url: &str, writer: &mut MarkdownWriter) -> anyhow::Result<()> {
        let html = match self.source.fetch(url) {
            Ok(html) => html,
            Err(e) => {
                warn!(slot, url, error = %e, "vacancy skipped");
                writeln!(self.output, "❌ Error: Kon pagina niet ophalen. ({e})")?;
                return Ok(());
            }
        };

        let extraction = extract(&html, url, self.settings);
        if let Err(e) = &extraction.structured {
            warn!(slot, url, error = %e, "structured data unusable");
            writeln!(
                self.output,
                "⚠️ Let op: {e}. Ontbrekende velden zijn aangevuld vanuit de pagina of als 'niet vermeld'."
            )?;
        }

        writer.append(slot, &extraction.record)?;
        writeln!(self.output, "✅ Vacature {slot} succesvol toegevoegd aan het bestand!")?;
        Ok(())
    }

    /// Prompt and read one trimmed line; `None` once input is exhausted.
    fn ask(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).context("cannot read from input")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn ask_required(&mut self, prompt: &str) -> anyhow::Result<String> {
        loop {
            match self.ask(prompt)? {
                Some(answer) if !answer.is_empty() => return Ok(answer),
                Some(_) => continue,
                None => bail!("input closed before answering '{}'", prompt.trim()),
            }
        }
    }
}
