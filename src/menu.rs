use anyhow::{anyhow, Error, Result};
use std::io::{BufRead, Write};

use trivia::config::Config;
use trivia::game::{Draw, GameSession, Player, DEFAULT_PLAYER_NAMES};
use trivia::repository::{Difficulty, QuestionRepository};

const INSTRUCTIONS: &str = "\
One or two players take turns answering multiple-choice questions.
Each question shows four choices labelled A to D; type the letter of your answer.
A correct answer earns 10 points (easy), 20 points (medium) or 30 points (hard).
A wrong answer earns nothing. The game ends after the configured number of
questions, or sooner if the question bank runs out. Highest score wins.";

/// Console front-end: collects input and forwards it to the repository and game session.
pub struct Menu<I, O> {
    repository: QuestionRepository,
    config: Config,
    input: I,
    output: O,
    input_closed: bool,
}

impl<I: BufRead, O: Write> Menu<I, O> {
    pub fn new(repository: QuestionRepository, config: Config, input: I, output: O) -> Self {
        Menu {
            repository,
            config,
            input,
            output,
            input_closed: false,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        loop {
            self.display_menu()?;
            let result = match self.ask("Choose an option") {
                Ok(choice) => match choice.as_str() {
                    "1" => self.view_instructions(),
                    "2" => self.start_game(1),
                    "3" => self.start_game(2),
                    "4" => self.list_questions(),
                    "5" => self.add_question(),
                    "6" => self.delete_question(),
                    "7" | "q" => return Ok(()),
                    other => {
                        writeln!(self.output, "Unknown option: {}", other).map_err(Error::from)
                    }
                },
                Err(e) => Err(e),
            };

            if let Err(e) = result {
                if self.input_closed {
                    return Ok(());
                }
                match e.downcast_ref::<trivia::Error>() {
                    Some(trivia_error) => writeln!(self.output, "Error: {}", trivia_error)?,
                    None => return Err(e),
                }
            }
        }
    }

    fn display_menu(&mut self) -> Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "=== Trivia ===")?;
        writeln!(self.output, "1. View instructions")?;
        writeln!(self.output, "2. Single player game")?;
        writeln!(self.output, "3. Two player game")?;
        writeln!(self.output, "4. List questions")?;
        writeln!(self.output, "5. Add a question")?;
        writeln!(self.output, "6. Delete a question")?;
        writeln!(self.output, "7. Quit")?;
        Ok(())
    }

    fn ask(&mut self, label: &str) -> Result<String> {
        write!(self.output, "{}: ", label)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            self.input_closed = true;
            return Err(anyhow!("Input closed"));
        }
        Ok(line.trim().to_owned())
    }

    fn view_instructions(&mut self) -> Result<()> {
        writeln!(self.output, "{}", INSTRUCTIONS)?;
        Ok(())
    }

    fn start_game(&mut self, num_players: usize) -> Result<()> {
        let mut names = Vec::new();
        for default_name in DEFAULT_PLAYER_NAMES.iter().take(num_players) {
            let name = self.ask(&format!("Name for {} (blank to keep)", default_name))?;
            names.push(if name.is_empty() {
                default_name.to_string()
            } else {
                name
            });
        }

        let topic = self.ask("Topic (blank for all)")?;
        let topic = Some(topic).filter(|t| !t.is_empty());
        let difficulty = self.ask("Difficulty: easy, medium or hard (blank for any)")?;
        let difficulty = if difficulty.is_empty() {
            None
        } else {
            Some(difficulty.parse::<Difficulty>()?)
        };

        let pool = self
            .repository
            .build_draw_pool(difficulty, topic.as_deref());
        let mut session = GameSession::new(pool, self.config.num_questions, &names[..])?;

        while !session.is_finished() {
            let presented = match session.present_next_question()? {
                Draw::Question(presented) => presented,
                Draw::Exhausted => {
                    writeln!(self.output, "No more questions available.")?;
                    break;
                }
            };

            let difficulty = presented
                .question
                .difficulty()
                .map(|d| d.to_string())
                .unwrap_or_else(|| "unrated".to_owned());
            writeln!(
                self.output,
                "\n{}, question {} of {} ({}, {}):",
                presented.player,
                presented.number,
                session.num_questions(),
                presented.question.topic(),
                difficulty
            )?;
            writeln!(self.output, "{}", presented.question.text())?;
            for choice in &presented.choices {
                writeln!(self.output, "  {}) {}", choice.letter, choice.text)?;
            }

            loop {
                let answer = self.ask("Your answer (A-D)")?;
                match session.score_answer(&presented.player, &answer) {
                    Ok(result) if result.is_correct => {
                        writeln!(
                            self.output,
                            "Correct! {} earns {} points.",
                            result.player, result.score_delta
                        )?;
                        break;
                    }
                    Ok(result) => {
                        writeln!(
                            self.output,
                            "Incorrect. The correct answer was {}.",
                            result.correct_answer
                        )?;
                        break;
                    }
                    Err(trivia::Error::Validation(reason)) => writeln!(self.output, "{}", reason)?,
                    Err(e) => return Err(e.into()),
                }
            }

            self.print_scores(session.scores())?;
        }

        writeln!(self.output, "\n{}", session.determine_winner())?;
        Ok(())
    }

    fn print_scores(&mut self, players: &[Player]) -> Result<()> {
        let scores: Vec<String> = players
            .iter()
            .map(|p| format!("{}: {}", p.name, p.score))
            .collect();
        writeln!(self.output, "Scores: {}", scores.join(", "))?;
        Ok(())
    }

    fn list_questions(&mut self) -> Result<()> {
        let topics = self.repository.topics();
        if topics.is_empty() {
            writeln!(self.output, "The question bank is empty.")?;
        }
        for topic in topics {
            writeln!(self.output, "[{}]", topic)?;
            for (position, question) in self
                .repository
                .get_questions(None, Some(topic))
                .iter()
                .enumerate()
            {
                let difficulty = question
                    .difficulty()
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "unrated".to_owned());
                writeln!(
                    self.output,
                    "  #{} ({}) {}",
                    position,
                    difficulty,
                    question.text()
                )?;
            }
        }
        Ok(())
    }

    fn add_question(&mut self) -> Result<()> {
        let topic = self.ask("Topic")?;
        let text = self.ask("Question")?;
        let correct_answer = self.ask("Correct answer")?;
        let mut incorrect_answers = Vec::new();
        for i in 1..=3 {
            incorrect_answers.push(self.ask(&format!("Incorrect answer {}", i))?);
        }
        let difficulty = self.ask("Difficulty (easy, medium or hard)")?;

        let incorrect_answers: Vec<&str> = incorrect_answers.iter().map(|a| a.as_str()).collect();
        let position = self.repository.add_question(
            &text,
            &correct_answer,
            &incorrect_answers,
            &difficulty,
            &topic,
        )?;
        writeln!(self.output, "Added question #{} to {}.", position, topic)?;
        Ok(())
    }

    fn delete_question(&mut self) -> Result<()> {
        let topic = self.ask("Topic")?;
        let position = self.ask("Question number")?;
        let position: usize = match position.trim_start_matches('#').parse() {
            Ok(position) => position,
            Err(_) => {
                writeln!(self.output, "{:?} is not a question number.", position)?;
                return Ok(());
            }
        };
        let removed = self.repository.delete_question(&topic, position)?;
        writeln!(self.output, "Deleted: {}", removed.text())?;
        Ok(())
    }
}
