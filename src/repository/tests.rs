use rand::rngs::StdRng;
use rand::{thread_rng, SeedableRng};
use std::collections::HashSet;
use std::fs;
use tempfile::TempDir;

use super::*;

struct ContextBuilder {
    files: Vec<(String, String)>,
}

impl ContextBuilder {
    fn new() -> Self {
        ContextBuilder { files: Vec::new() }
    }

    fn file(mut self, name: &str, content: &str) -> Self {
        self.files.push((name.to_owned(), content.to_owned()));
        self
    }

    fn build(self) -> Context {
        let dir = TempDir::new().unwrap();
        for (name, content) in &self.files {
            fs::write(dir.path().join(name), content).unwrap();
        }
        let repository = QuestionRepository::open(dir.path()).unwrap();
        Context { dir, repository }
    }
}

struct Context {
    dir: TempDir,
    repository: QuestionRepository,
}

impl Context {
    fn add(&mut self, text: &str, difficulty: &str, topic: &str) -> usize {
        self.repository
            .add_question(
                text,
                &format!("{} answer", text),
                &["wrong 1", "wrong 2", "wrong 3"],
                difficulty,
                topic,
            )
            .unwrap()
    }

    fn read_partition(&self, topic: &str) -> String {
        fs::read_to_string(self.dir.path().join(format!("{}.csv", topic))).unwrap()
    }

    fn reopen(&self) -> QuestionRepository {
        QuestionRepository::open(self.dir.path()).unwrap()
    }
}

#[test]
fn added_question_is_readable_and_stored() {
    let mut ctx = ContextBuilder::new().build();
    ctx.add("Capital of France?", "easy", "geography");

    let questions = ctx.repository.get_questions(None, Some("geography"));
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].text(), "Capital of France?");
    assert_eq!(questions[0].topic(), "geography");
    assert_eq!(questions[0].difficulty(), Some(Difficulty::Easy));

    let content = ctx.read_partition("geography");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Question,Correct Answer,Option A,Option B,Option C,Difficulty",
            "Capital of France?,Capital of France? answer,wrong 1,wrong 2,wrong 3,easy",
        ]
    );
}

#[test]
fn each_add_appends_one_line() {
    let mut ctx = ContextBuilder::new().build();
    ctx.add("first", "easy", "science");
    let before = ctx.read_partition("science").lines().count();
    ctx.add("second", "hard", "science");
    let after = ctx.read_partition("science");
    assert_eq!(after.lines().count(), before + 1);
    assert!(after.lines().last().unwrap().starts_with("second,"));
}

#[test]
fn added_questions_survive_reopening() {
    let mut ctx = ContextBuilder::new().build();
    ctx.add("first", "easy", "science");
    ctx.add("second", "medium", "science");
    let reopened = ctx.reopen();
    assert_eq!(
        reopened.get_questions(None, None),
        ctx.repository.get_questions(None, None)
    );
}

#[test]
fn rejects_wrong_number_of_incorrect_answers() {
    let mut ctx = ContextBuilder::new().build();
    let result = ctx
        .repository
        .add_question("q", "a", &["b", "c"], "easy", "science");
    assert!(matches!(result, Err(Error::Validation(_))));
    let result = ctx
        .repository
        .add_question("q", "a", &["b", "c", "d", "e"], "easy", "science");
    assert!(matches!(result, Err(Error::Validation(_))));
}

#[test]
fn rejects_duplicate_answers() {
    let mut ctx = ContextBuilder::new().build();
    let result = ctx
        .repository
        .add_question("q", "Paris", &["Lyon", " paris", "Nice"], "easy", "geography");
    assert!(matches!(result, Err(Error::Validation(_))));
    let result = ctx
        .repository
        .add_question("q", "Paris", &["Lyon", "Nice", "Nice"], "easy", "geography");
    assert!(matches!(result, Err(Error::Validation(_))));
}

#[test]
fn rejects_unknown_difficulty_without_writing() {
    let mut ctx = ContextBuilder::new().build();
    let result = ctx
        .repository
        .add_question("q", "a", &["b", "c", "d"], "impossible", "science");
    assert!(matches!(result, Err(Error::Validation(_))));
    assert!(ctx.repository.topics().is_empty());
    assert!(!ctx.dir.path().join("science.csv").exists());
}

#[test]
fn rejects_topic_names_unfit_for_files() {
    let mut ctx = ContextBuilder::new().build();
    for topic in &["", "../escape", "a/b", "-dash", "a.b"] {
        let result = ctx
            .repository
            .add_question("q", "a", &["b", "c", "d"], "easy", topic);
        assert!(matches!(result, Err(Error::Validation(_))), "{:?}", topic);
    }
}

#[test]
fn topics_are_trimmed_before_use() {
    let mut ctx = ContextBuilder::new().build();
    ctx.add("q", "easy", " geography ");
    assert_eq!(ctx.repository.topics(), vec!["geography"]);
    assert!(ctx.dir.path().join("geography.csv").exists());
    assert!(validate_topic("geography ").is_err());
}

#[test]
fn rejects_topic_differing_only_by_case() {
    let mut ctx = ContextBuilder::new().build();
    ctx.add("first", "easy", "geography");
    let result = ctx
        .repository
        .add_question("q", "a", &["b", "c", "d"], "easy", "Geography");
    assert!(matches!(result, Err(Error::Validation(_))));
    assert_eq!(ctx.repository.topics(), vec!["geography"]);
    assert!(!ctx.dir.path().join("Geography.csv").exists());
}

#[test]
fn rejects_separator_in_incorrect_answers() {
    let mut ctx = ContextBuilder::new()
        .file(
            "music.csv",
            "Question,Correct Answer,Incorrect Answers,Difficulty\n\
             Who wrote Bolero?,Ravel,Debussy|Satie|Faure,medium\n",
        )
        .build();
    let before = ctx.read_partition("music");

    let result = ctx.repository.add_question(
        "Best band?",
        "Queen",
        &["AC|DC", "Abba", "Blur"],
        "easy",
        "music",
    );
    assert!(matches!(result, Err(Error::Validation(_))));
    assert_eq!(ctx.read_partition("music"), before);
    assert_eq!(ctx.reopen().get_questions(None, Some("music")).len(), 1);
}

#[test]
fn filters_by_difficulty_and_topic() {
    let mut ctx = ContextBuilder::new().build();
    ctx.add("geo easy", "easy", "geography");
    ctx.add("geo hard", "hard", "geography");
    ctx.add("sci easy", "easy", "science");

    let texts = |questions: Vec<Question>| -> Vec<String> {
        questions.iter().map(|q| q.text().to_owned()).collect()
    };

    assert_eq!(
        texts(ctx.repository.get_questions(None, None)),
        vec!["geo easy", "geo hard", "sci easy"]
    );
    assert_eq!(
        texts(ctx.repository.get_questions(Some(Difficulty::Easy), None)),
        vec!["geo easy", "sci easy"]
    );
    assert_eq!(
        texts(ctx.repository.get_questions(None, Some("geography"))),
        vec!["geo easy", "geo hard"]
    );
    assert_eq!(
        texts(ctx.repository.get_questions(Some(Difficulty::Hard), Some("geography"))),
        vec!["geo hard"]
    );
    assert!(ctx
        .repository
        .get_questions(Some(Difficulty::Medium), None)
        .is_empty());
    assert!(ctx.repository.get_questions(None, Some("history")).is_empty());
}

#[test]
fn delete_removes_question_at_position() {
    let mut ctx = ContextBuilder::new().build();
    ctx.add("first", "easy", "science");
    ctx.add("second", "easy", "science");
    ctx.add("third", "easy", "science");

    let removed = ctx.repository.delete_question("science", 1).unwrap();
    assert_eq!(removed.text(), "second");

    let texts: Vec<String> = ctx
        .repository
        .get_questions(None, Some("science"))
        .iter()
        .map(|q| q.text().to_owned())
        .collect();
    assert_eq!(texts, vec!["first", "third"]);
    assert_eq!(ctx.read_partition("science").lines().count(), 3);
    assert!(!ctx.dir.path().join("science.csv.tmp").exists());
    assert_eq!(ctx.reopen().get_questions(None, None).len(), 2);
    assert_eq!(ctx.repository.get_question("science", 1).unwrap().text(), "third");
}

#[test]
fn delete_missing_question_leaves_file_untouched() {
    let mut ctx = ContextBuilder::new().build();
    ctx.add("only", "easy", "science");
    let before = fs::read(ctx.dir.path().join("science.csv")).unwrap();

    let result = ctx.repository.delete_question("science", 1);
    assert!(matches!(result, Err(Error::NotFound(_))));
    let result = ctx.repository.delete_question("history", 0);
    assert!(matches!(result, Err(Error::NotFound(_))));

    let after = fs::read(ctx.dir.path().join("science.csv")).unwrap();
    assert_eq!(before, after);
    assert_eq!(ctx.repository.get_questions(None, None).len(), 1);
}

#[test]
fn loads_piped_layout_and_keeps_it() {
    let mut ctx = ContextBuilder::new()
        .file(
            "music.csv",
            "Question, Correct Answer, Incorrect Answers, Difficulty\n\
             Who wrote Bolero?, Ravel, Debussy|Satie|Faure, medium\n",
        )
        .build();
    let questions = ctx.repository.get_questions(None, Some("music"));
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].correct_answer(), "Ravel");
    assert_eq!(
        questions[0].incorrect_answers(),
        &["Debussy".to_owned(), "Satie".to_owned(), "Faure".to_owned()]
    );
    assert_eq!(questions[0].difficulty(), Some(Difficulty::Medium));

    ctx.add("Who wrote Carmen?", "hard", "music");
    let content = ctx.read_partition("music");
    assert_eq!(
        content.lines().last().unwrap(),
        "Who wrote Carmen?,Who wrote Carmen? answer,wrong 1|wrong 2|wrong 3,hard"
    );
}

#[test]
fn loads_blank_difficulty_as_unrated() {
    let ctx = ContextBuilder::new()
        .file(
            "misc.csv",
            "Question,Correct Answer,Option A,Option B,Option C,Difficulty\n\
             q1,a,b,c,d,\n\
             q2,a,b,c,d,legendary\n",
        )
        .build();
    let questions = ctx.repository.get_questions(None, None);
    assert_eq!(questions.len(), 2);
    assert!(questions.iter().all(|q| q.difficulty().is_none()));
}

#[test]
fn append_repairs_missing_trailing_newline() {
    let mut ctx = ContextBuilder::new()
        .file(
            "misc.csv",
            "Question,Correct Answer,Option A,Option B,Option C,Difficulty\nq1,a,b,c,d,easy",
        )
        .build();
    ctx.add("q2", "easy", "misc");
    assert_eq!(ctx.read_partition("misc").lines().count(), 3);
    assert_eq!(ctx.reopen().get_questions(None, Some("misc")).len(), 2);
}

#[test]
fn missing_columns_is_a_schema_error() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("broken.csv"),
        "Question,Correct Answer,Option A\nq,a,b\n",
    )
    .unwrap();
    let result = QuestionRepository::open(dir.path());
    match result {
        Err(Error::Schema { reason, .. }) => {
            assert!(reason.contains("Difficulty"));
            assert!(reason.contains("Option B"));
        }
        other => panic!("expected schema error, got {:?}", other),
    }
}

#[test]
fn wrong_answer_count_in_file_is_a_schema_error() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("broken.csv"),
        "Question,Correct Answer,Incorrect Answers,Difficulty\nq,a,b|c,easy\n",
    )
    .unwrap();
    let result = QuestionRepository::open(dir.path());
    assert!(matches!(result, Err(Error::Schema { .. })));
}

#[test]
fn duplicate_answers_in_file_are_a_schema_error() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("geography.csv"),
        "Question,Correct Answer,Option A,Option B,Option C,Difficulty\n\
         Capital?,Paris,paris,Lyon,Nice,hard\n",
    )
    .unwrap();
    match QuestionRepository::open(dir.path()) {
        Err(Error::Schema { path, reason }) => {
            assert_eq!(path, dir.path().join("geography.csv"));
            assert!(reason.starts_with("row 1:"), "{}", reason);
            assert!(reason.contains("differ"), "{}", reason);
        }
        other => panic!("expected schema error, got {:?}", other),
    }
}

#[test]
fn empty_correct_answer_in_file_is_a_schema_error() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("misc.csv"),
        "Question,Correct Answer,Option A,Option B,Option C,Difficulty\n\
         q1,a,b,c,d,easy\n\
         q2,,b,c,d,easy\n",
    )
    .unwrap();
    match QuestionRepository::open(dir.path()) {
        Err(Error::Schema { reason, .. }) => assert!(reason.starts_with("row 2:"), "{}", reason),
        other => panic!("expected schema error, got {:?}", other),
    }
}

#[test]
fn ignores_files_that_are_not_partitions() {
    let ctx = ContextBuilder::new()
        .file("notes.txt", "not a question bank")
        .file("science.csv.tmp", "garbage")
        .build();
    assert!(ctx.repository.topics().is_empty());
}

#[test]
fn draw_pool_yields_each_question_once() {
    let mut ctx = ContextBuilder::new().build();
    for i in 0..10 {
        ctx.add(&format!("question {}", i), "easy", "science");
    }
    let mut pool = ctx.repository.build_draw_pool(None, None);
    assert_eq!(pool.len(), 10);

    let mut rng = thread_rng();
    let mut drawn = HashSet::new();
    for _ in 0..10 {
        let question = pool.draw_random(&mut rng).unwrap();
        assert!(drawn.insert(question.text().to_owned()));
    }
    assert!(pool.is_empty());
    assert!(pool.draw_random(&mut rng).is_none());
}

#[test]
fn every_question_can_be_drawn_first() {
    let mut ctx = ContextBuilder::new().build();
    for i in 0..4 {
        ctx.add(&format!("question {}", i), "easy", "science");
    }

    let mut rng = StdRng::seed_from_u64(7);
    let mut first_draws = HashSet::new();
    for _ in 0..200 {
        let mut pool = ctx.repository.build_draw_pool(None, None);
        let question = pool.draw_random(&mut rng).unwrap();
        first_draws.insert(question.text().to_owned());
    }
    assert_eq!(first_draws.len(), 4);
}

#[test]
fn draw_pool_is_independent_from_storage() {
    let mut ctx = ContextBuilder::new().build();
    ctx.add("first", "easy", "science");
    ctx.add("second", "hard", "science");

    let mut pool = ctx.repository.build_draw_pool(None, Some("science"));
    pool.draw_random(&mut thread_rng()).unwrap();
    assert_eq!(pool.len(), 1);
    assert_eq!(ctx.repository.get_questions(None, None).len(), 2);
    assert_eq!(ctx.read_partition("science").lines().count(), 3);

    ctx.repository.delete_question("science", 0).unwrap();
    assert_eq!(pool.len(), 1);
}

#[test]
fn reset_pool_reuses_last_filter() {
    let mut ctx = ContextBuilder::new().build();
    ctx.add("geo easy", "easy", "geography");
    ctx.add("geo hard", "hard", "geography");
    ctx.add("sci hard", "hard", "science");

    let mut pool = ctx.repository.build_draw_pool(Some(Difficulty::Hard), None);
    let mut rng = thread_rng();
    while pool.draw_random(&mut rng).is_some() {}
    assert!(pool.is_empty());

    ctx.add("sci hard 2", "hard", "science");
    ctx.repository.reset_pool(&mut pool);
    assert_eq!(pool.len(), 3);
    assert!(pool
        .questions()
        .iter()
        .all(|q| q.difficulty() == Some(Difficulty::Hard)));
}

#[test]
fn empty_topic_builds_empty_pool() {
    let ctx = ContextBuilder::new()
        .file(
            "empty.csv",
            "Question,Correct Answer,Option A,Option B,Option C,Difficulty\n",
        )
        .build();
    assert_eq!(ctx.repository.topics(), vec!["empty"]);
    let mut pool = ctx.repository.build_draw_pool(None, Some("empty"));
    assert!(pool.draw_random(&mut thread_rng()).is_none());
}
