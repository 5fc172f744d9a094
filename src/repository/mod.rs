use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{Error, Result};

mod partition;
mod pool;
mod question;

#[cfg(test)]
mod tests;

pub use partition::PARTITION_EXTENSION;
pub use pool::{DrawPool, QuestionFilter};
pub use question::{
    normalize_answer, validate_topic, Difficulty, Question, ANSWER_SEPARATOR,
    INCORRECT_ANSWER_COUNT,
};

use partition::Partition;

/// The question bank: one partition file per topic under a root directory.
///
/// A question is identified by its topic and its position within that topic, as observed
/// by the latest read. Positions after a deleted question shift down by one.
#[derive(Debug)]
pub struct QuestionRepository {
    root: PathBuf,
    partitions: BTreeMap<String, Partition>,
}

impl QuestionRepository {
    pub fn open<P: AsRef<Path>>(root: P) -> Result<QuestionRepository> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| Error::schema(&root, e))?;

        let mut partitions = BTreeMap::new();
        for entry in fs::read_dir(&root).map_err(|e| Error::schema(&root, e))? {
            let path = entry.map_err(|e| Error::schema(&root, e))?.path();
            if !path.is_file() || path.extension() != Some(OsStr::new(PARTITION_EXTENSION)) {
                continue;
            }
            let name = match path.file_stem().and_then(|s| s.to_str()) {
                Some(name) if validate_topic(name).is_ok() => name.to_owned(),
                _ => {
                    warn!("Ignoring question file with unusable name: {}", path.display());
                    continue;
                }
            };
            let partition = Partition::open(&path, &name)?;
            info!(
                "Loaded {} questions for topic {:?}",
                partition.questions().len(),
                name
            );
            partitions.insert(name, partition);
        }

        Ok(QuestionRepository { root, partitions })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn topics(&self) -> Vec<&str> {
        self.partitions.keys().map(|k| k.as_str()).collect()
    }

    /// Validates and durably appends a question, returning its position within its topic.
    pub fn add_question(
        &mut self,
        text: &str,
        correct_answer: &str,
        incorrect_answers: &[&str],
        difficulty: &str,
        topic: &str,
    ) -> Result<usize> {
        let topic = topic.trim();
        let question = Question::new(text, correct_answer, incorrect_answers, difficulty, topic)?;
        if !self.partitions.contains_key(topic) {
            if let Some(existing) = self
                .partitions
                .keys()
                .find(|name| name.eq_ignore_ascii_case(topic))
            {
                return Err(Error::Validation(format!(
                    "Topic {:?} differs from existing topic {:?} only by case",
                    topic, existing
                )));
            }
        }
        let root = &self.root;
        let partition = self
            .partitions
            .entry(topic.to_owned())
            .or_insert_with(|| Partition::create(root, topic));
        let position = match partition.append(question) {
            Ok(position) => position,
            Err(e) => {
                if partition.questions().is_empty() {
                    self.partitions.remove(topic);
                }
                return Err(e);
            }
        };
        info!(
            "Added question #{} to topic {:?} ({})",
            position,
            topic,
            partition.path().display()
        );
        Ok(position)
    }

    pub fn delete_question(&mut self, topic: &str, position: usize) -> Result<Question> {
        let partition = self
            .partitions
            .get_mut(topic)
            .ok_or_else(|| Error::NotFound(format!("topic {:?}", topic)))?;
        let removed = partition.remove(position)?;
        info!("Deleted question #{} from topic {:?}", position, topic);
        Ok(removed)
    }

    pub fn get_question(&self, topic: &str, position: usize) -> Result<&Question> {
        self.partitions
            .get(topic)
            .ok_or_else(|| Error::NotFound(format!("topic {:?}", topic)))?
            .questions()
            .get(position)
            .ok_or_else(|| {
                Error::NotFound(format!("question #{} in topic {:?}", position, topic))
            })
    }

    /// Questions matching both filters, by topic name then file order.
    pub fn get_questions(
        &self,
        difficulty: Option<Difficulty>,
        topic: Option<&str>,
    ) -> Vec<Question> {
        self.select(&QuestionFilter::new(difficulty, topic))
    }

    pub fn build_draw_pool(
        &self,
        difficulty: Option<Difficulty>,
        topic: Option<&str>,
    ) -> DrawPool {
        let filter = QuestionFilter::new(difficulty, topic);
        DrawPool::new(self.select(&filter), filter)
    }

    /// Refills `pool` from storage with the filter it was built with.
    pub fn reset_pool(&self, pool: &mut DrawPool) {
        let questions = self.select(pool.filter());
        pool.refill(questions);
    }

    fn select(&self, filter: &QuestionFilter) -> Vec<Question> {
        self.partitions
            .values()
            .filter(|p| filter.topic.as_ref().map_or(true, |t| p.name() == t.as_str()))
            .flat_map(|p| p.questions().iter())
            .filter(|q| filter.matches(q))
            .cloned()
            .collect()
    }
}
