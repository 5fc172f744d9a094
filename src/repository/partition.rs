use csv::{StringRecord, Trim};
use itertools::Itertools;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::question::{Question, RawQuestion, ANSWER_SEPARATOR};
use crate::error::{Error, Result};

pub const PARTITION_EXTENSION: &str = "csv";

const COLUMN_QUESTION: &str = "Question";
const COLUMN_CORRECT_ANSWER: &str = "Correct Answer";
const COLUMN_OPTION_A: &str = "Option A";
const COLUMN_OPTION_B: &str = "Option B";
const COLUMN_OPTION_C: &str = "Option C";
const COLUMN_INCORRECT_ANSWERS: &str = "Incorrect Answers";
const COLUMN_DIFFICULTY: &str = "Difficulty";

/// How incorrect answers are laid out in a partition file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    /// One column per incorrect answer.
    Columns,
    /// All incorrect answers in one column, joined with `|`.
    Piped,
}

impl Layout {
    fn detect(headers: &StringRecord) -> std::result::Result<Layout, String> {
        let has = |name: &str| headers.iter().any(|h| h == name);

        let mut missing: Vec<&str> = [COLUMN_QUESTION, COLUMN_CORRECT_ANSWER, COLUMN_DIFFICULTY]
            .iter()
            .copied()
            .filter(|c| !has(*c))
            .collect();

        let layout = if [COLUMN_OPTION_A, COLUMN_OPTION_B, COLUMN_OPTION_C]
            .iter()
            .all(|c| has(*c))
        {
            Some(Layout::Columns)
        } else if has(COLUMN_INCORRECT_ANSWERS) {
            Some(Layout::Piped)
        } else {
            missing.push("Option A, Option B, Option C (or Incorrect Answers)");
            None
        };

        match layout {
            Some(layout) if missing.is_empty() => Ok(layout),
            _ => Err(format!("missing columns: {}", missing.join(", "))),
        }
    }

    fn header(&self) -> Vec<&'static str> {
        match self {
            Layout::Columns => vec![
                COLUMN_QUESTION,
                COLUMN_CORRECT_ANSWER,
                COLUMN_OPTION_A,
                COLUMN_OPTION_B,
                COLUMN_OPTION_C,
                COLUMN_DIFFICULTY,
            ],
            Layout::Piped => vec![
                COLUMN_QUESTION,
                COLUMN_CORRECT_ANSWER,
                COLUMN_INCORRECT_ANSWERS,
                COLUMN_DIFFICULTY,
            ],
        }
    }

    fn record(&self, question: &Question) -> Vec<String> {
        let difficulty = question
            .difficulty()
            .map(|d| d.as_str().to_owned())
            .unwrap_or_default();
        let mut record = vec![
            question.text().to_owned(),
            question.correct_answer().to_owned(),
        ];
        match self {
            Layout::Columns => record.extend(question.incorrect_answers().iter().cloned()),
            Layout::Piped => record.push(
                question
                    .incorrect_answers()
                    .iter()
                    .join(&ANSWER_SEPARATOR.to_string()),
            ),
        }
        record.push(difficulty);
        record
    }
}

/// The durable questions of one topic, backed by `<root>/<topic>.csv`.
#[derive(Debug)]
pub struct Partition {
    name: String,
    path: PathBuf,
    layout: Layout,
    questions: Vec<Question>,
}

impl Partition {
    pub fn path_for(root: &Path, name: &str) -> PathBuf {
        let mut path = root.to_path_buf();
        path.push(format!("{}.{}", name, PARTITION_EXTENSION));
        path
    }

    /// A partition that does not exist on disk until its first question is appended.
    pub fn create(root: &Path, name: &str) -> Partition {
        Partition {
            name: name.to_owned(),
            path: Self::path_for(root, name),
            layout: Layout::Columns,
            questions: Vec::new(),
        }
    }

    pub fn open(path: &Path, name: &str) -> Result<Partition> {
        let file = File::open(path).map_err(|e| Error::schema(path, e))?;
        let mut reader = csv::ReaderBuilder::new()
            .trim(Trim::All)
            .from_reader(file);

        let headers = reader
            .headers()
            .map_err(|e| Error::schema(path, e))?
            .clone();

        // A file created right before a crash may not even hold its header yet.
        if headers.is_empty() {
            return Ok(Partition {
                name: name.to_owned(),
                path: path.to_path_buf(),
                layout: Layout::Columns,
                questions: Vec::new(),
            });
        }

        let layout = Layout::detect(&headers).map_err(|reason| Error::schema(path, reason))?;

        let mut questions = Vec::new();
        for (index, row) in reader.deserialize().enumerate() {
            let raw_question: RawQuestion =
                row.map_err(|e| Error::schema(path, format!("row {}: {}", index + 1, e)))?;
            let question = raw_question
                .into_question(name)
                .map_err(|reason| Error::schema(path, format!("row {}: {}", index + 1, reason)))?;
            questions.push(question);
        }

        Ok(Partition {
            name: name.to_owned(),
            path: path.to_path_buf(),
            layout,
            questions,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Appends one record to the partition file and syncs it before returning.
    pub fn append(&mut self, question: Question) -> Result<usize> {
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)?;

        let length = file.metadata()?.len();
        let needs_header = length == 0;
        if !needs_header && !ends_with_newline(&mut file)? {
            file.write_all(b"\n")?;
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            writer.write_record(self.layout.header())?;
        }
        writer.write_record(self.layout.record(&question))?;
        let file = writer.into_inner().map_err(|e| Error::Storage(e.into_error()))?;
        file.sync_all()?;
        if needs_header {
            sync_parent_dir(&self.path)?;
        }

        self.questions.push(question);
        Ok(self.questions.len() - 1)
    }

    /// Removes the question at `position`.
    /// The file is replaced atomically; a miss leaves it untouched.
    pub fn remove(&mut self, position: usize) -> Result<Question> {
        if position >= self.questions.len() {
            return Err(Error::NotFound(format!(
                "question #{} in topic {:?} ({} questions)",
                position,
                self.name,
                self.questions.len()
            )));
        }

        let mut remaining = self.questions.clone();
        let removed = remaining.remove(position);
        self.rewrite(&remaining)?;
        self.questions = remaining;
        Ok(removed)
    }

    fn rewrite(&self, questions: &[Question]) -> Result<()> {
        let mut temp_path = self.path.clone();
        temp_path.set_extension(format!("{}.tmp", PARTITION_EXTENSION));

        let file = File::create(&temp_path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(self.layout.header())?;
        for question in questions {
            writer.write_record(self.layout.record(question))?;
        }
        let file = writer.into_inner().map_err(|e| Error::Storage(e.into_error()))?;
        file.sync_all()?;

        fs::rename(&temp_path, &self.path)?;
        sync_parent_dir(&self.path)
    }
}

fn ends_with_newline(file: &mut File) -> Result<bool> {
    let mut last_byte = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last_byte)?;
    Ok(last_byte[0] == b'\n')
}

// Makes a file creation or rename durable.
fn sync_parent_dir(path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    File::open(dir)?.sync_all()?;
    Ok(())
}
