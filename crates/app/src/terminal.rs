//! Line-oriented terminal front end for the mock test and quiz runs.

use std::fmt;

use anyhow::Context;
use quiz_core::model::{OPTION_COUNT, QuizId, UserAnswer, UserId};
use services::{Intent, Notice, Phase, QuizTakingService, SessionFrame, Step, TestDriver};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc::UnboundedReceiver;
use ui::vm::{
    AttemptCardVm, ChipStatus, OptionMark, ResultsVm, TestScreenVm, format_countdown,
    markdown_to_plain, notice_text,
};

pub type StdinLines = Lines<BufReader<Stdin>>;

#[must_use]
pub fn stdin_lines() -> StdinLines {
    BufReader::new(tokio::io::stdin()).lines()
}

const HELP: &str = "\
commands:
  start            begin the test
  a-d or 1-4       choose an option
  s, skip          skip this question
  m, mark          toggle mark for review
  n, next          next question
  p, prev          previous question
  g N, goto N      jump to question N
  end, submit      finish and see results
  restart          throw away progress and reshuffle
  q, quit          leave (progress is kept)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Intent(Intent),
    Help,
    Quit,
}

/// Parse one line of user input. Unknown input yields `None`.
#[must_use]
pub fn parse_input(line: &str) -> Option<Input> {
    let line = line.trim().to_ascii_lowercase();
    let mut words = line.split_whitespace();
    let head = words.next()?;

    let input = match head {
        "start" => Input::Intent(Intent::Start),
        "s" | "skip" => Input::Intent(Intent::Skip),
        "m" | "mark" => Input::Intent(Intent::ToggleMark),
        "n" | "next" => Input::Intent(Intent::Next),
        "p" | "prev" | "previous" => Input::Intent(Intent::Previous),
        "end" | "submit" => Input::Intent(Intent::End),
        "restart" => Input::Intent(Intent::Restart),
        "g" | "goto" => {
            let number: usize = words.next()?.parse().ok()?;
            Input::Intent(Intent::Jump(number.checked_sub(1)?))
        }
        "h" | "help" | "?" => Input::Help,
        "q" | "quit" | "exit" => Input::Quit,
        other => Input::Intent(Intent::Select(parse_option(other)?)),
    };
    Some(input)
}

/// `a`-`d` or `1`-`4` to a zero-based option index.
fn parse_option(word: &str) -> Option<usize> {
    let mut chars = word.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    let index = match c {
        'a'..='z' => usize::from(c as u8 - b'a'),
        '1'..='9' => usize::from(c as u8 - b'1'),
        _ => return None,
    };
    (index < OPTION_COUNT).then_some(index)
}

//
// ─── RENDERING ─────────────────────────────────────────────────────────────────
//

/// Plain-text layout of one test screen.
pub struct ScreenText<'a>(pub &'a TestScreenVm);

impl fmt::Display for ScreenText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vm = self.0;
        let flag = if vm.marked { "  [marked]" } else { "" };
        writeln!(
            f,
            "\n{}  ({})  time {}{}",
            vm.progress_label, vm.difficulty_label, vm.timer_label, flag
        )?;
        writeln!(f, "{}\n", vm.prompt)?;

        for option in &vm.options {
            let tag = match option.mark {
                OptionMark::Correct => "  <- correct",
                OptionMark::Incorrect => "  <- your answer",
                OptionMark::Neutral => "",
            };
            writeln!(f, "  {}) {}{}", option.letter, option.text, tag)?;
        }
        if let Some(explanation) = &vm.explanation {
            writeln!(f, "\n{explanation}")?;
        }

        write!(f, "\n[")?;
        for (i, chip) in vm.chips.iter().enumerate() {
            let status = match chip.status {
                ChipStatus::Current => '>',
                ChipStatus::Answered => '+',
                ChipStatus::Skipped => '-',
                ChipStatus::Unvisited => '.',
            };
            let sep = if i == 0 { "" } else { " " };
            let mark = if chip.marked { "*" } else { "" };
            write!(f, "{sep}{status}{}{mark}", chip.number)?;
        }
        writeln!(f, "]  {}", vm.tally_label)
    }
}

/// Plain-text layout of the results page.
pub struct ResultsText<'a>(pub &'a ResultsVm);

impl fmt::Display for ResultsText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vm = self.0;
        writeln!(
            f,
            "\nScore {} ({}) - {}",
            vm.score_label, vm.percentage_label, vm.tier_label
        )?;
        writeln!(
            f,
            "{} correct, {} incorrect, {} skipped, {} marked",
            vm.correct, vm.incorrect, vm.skipped, vm.marked
        )?;
        for row in &vm.difficulty_rows {
            write!(f, "  {:<6} {}/{} ", row.label, row.correct, row.total)?;
            match row.percentage {
                Some(p) => writeln!(f, "{p}%")?,
                None => writeln!(f, "-")?,
            }
        }
        writeln!(f, "\n{}\n", vm.recommendation)?;

        for item in &vm.items {
            let marked = if item.marked { " *" } else { "" };
            writeln!(
                f,
                "{}. {} [{}]{}",
                item.number,
                item.prompt,
                item.status.label(),
                marked
            )?;
            if let Some(answer) = &item.your_answer {
                writeln!(f, "   your answer: {answer}")?;
            }
            writeln!(f, "   correct: {}", item.correct_answer)?;
            if !item.explanation_text.is_empty() {
                writeln!(f, "   {}", item.explanation_text)?;
            }
        }
        Ok(())
    }
}

#[must_use]
pub fn render_screen(vm: &TestScreenVm) -> String {
    ScreenText(vm).to_string()
}

#[must_use]
pub fn render_results(vm: &ResultsVm) -> String {
    ResultsText(vm).to_string()
}

fn print_frame(frame: &SessionFrame) {
    match frame.phase {
        Phase::NotStarted => println!(
            "\n{} questions, {} per question. Type `start` to begin, `help` for commands.",
            frame.total,
            format_countdown(frame.budget)
        ),
        Phase::InProgress => print!("{}", render_screen(&TestScreenVm::from_frame(frame))),
        Phase::Completed => {
            if let Some(review) = &frame.review {
                print!("{}", render_results(&ResultsVm::from(review)));
            }
            println!("Type `restart` for a new round or `quit` to leave.");
        }
    }
}

//
// ─── MOCK TEST ─────────────────────────────────────────────────────────────────
//

/// Drive a mock test from stdin until the user quits or input ends.
///
/// # Errors
///
/// Returns an error if stdin fails or the driver stops unexpectedly.
pub async fn run_mock_test(
    driver: TestDriver,
    mut notices: UnboundedReceiver<Notice>,
    lines: &mut StdinLines,
) -> anyhow::Result<()> {
    let mut frames = driver.frames();
    let first = frames.borrow_and_update().clone();
    print_frame(&first);
    let mut shown: (Phase, usize, Vec<UserAnswer>) = (first.phase, first.pointer, first.answers);
    let mut last_remaining = Some(first.remaining);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else {
                    break;
                };
                match parse_input(&line) {
                    Some(Input::Quit) => break,
                    Some(Input::Help) => println!("{HELP}"),
                    Some(Input::Intent(intent)) => match driver.dispatch(intent).await? {
                        Step::Ignored => println!("Not available right now."),
                        Step::ReachedEnd => println!("That was the last question. Type `end` to submit."),
                        Step::Applied => {}
                    },
                    None if line.trim().is_empty() => {}
                    None => println!("Unknown command. Type `help`."),
                }
            }
            Some(notice) = notices.recv() => println!("{}", notice_text(notice)),
            changed = frames.changed() => {
                if changed.is_err() {
                    break;
                }
                let frame = frames.borrow_and_update().clone();
                let key = (frame.phase, frame.pointer, frame.answers.clone());
                if shown != key {
                    print_frame(&frame);
                    shown = key;
                    last_remaining = Some(frame.remaining);
                } else if frame.phase == Phase::InProgress
                    && last_remaining != Some(frame.remaining)
                {
                    let vm = TestScreenVm::from_frame(&frame);
                    if vm.low_time {
                        println!("  {} left", vm.timer_label);
                    }
                    last_remaining = Some(frame.remaining);
                }
            }
        }
    }
    Ok(())
}

//
// ─── QUIZ RUN ──────────────────────────────────────────────────────────────────
//

/// Ask each question of a published quiz in order, then record the attempt.
/// Returns `None` if the user quit before the end.
///
/// # Errors
///
/// Returns an error if the quiz cannot be started or the attempt not saved.
pub async fn take_quiz(
    service: &QuizTakingService,
    user: UserId,
    quiz_id: QuizId,
    lines: &mut StdinLines,
) -> anyhow::Result<Option<AttemptCardVm>> {
    let mut run = service.begin(user, quiz_id).await?;
    let title = run.quiz().title().to_owned();
    let questions = run.quiz().questions().to_vec();
    println!("\n{title}: {} questions. Enter a-d, blank to skip, q to quit.", questions.len());

    for (index, question) in questions.iter().enumerate() {
        println!("\n{}. {}", index + 1, question.prompt());
        for (letter, option) in ('a'..).zip(question.options()) {
            println!("  {letter}) {option}");
        }

        loop {
            let Some(line) = lines.next_line().await.context("reading stdin")? else {
                return Ok(None);
            };
            let line = line.trim().to_ascii_lowercase();
            match line.as_str() {
                "" | "s" | "skip" => break,
                "q" | "quit" => return Ok(None),
                word => match parse_option(word) {
                    Some(option) => {
                        let correct = run.answer(index, option)?;
                        if correct {
                            println!("Correct!");
                        } else {
                            println!("Incorrect.");
                        }
                        if !question.explanation().is_empty() {
                            println!("{}", markdown_to_plain(question.explanation()));
                        }
                        break;
                    }
                    None => println!("Enter a-d, blank to skip, or q."),
                },
            }
        }
    }

    let row = service.submit(run).await?;
    Ok(Some(AttemptCardVm::new(&row, Some(&title))))
}
