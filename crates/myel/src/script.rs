//! Replay scripts: one editor command per line.
//!
//! ```text
//! # comments and blank lines are ignored
//! tool axon
//! press 30 40
//! release 30 40
//! tool count Myelinated Axons
//! shift-press 10 10
//! undo
//! ```

use myel_core::{
    Category, Editor, Modifiers, PointerEvent, PointerKind, Tool, MYELINATED_GROUP,
    UNMYELINATED_GROUP,
};

/// One parsed script line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Switch tools.
    Tool(Tool),
    /// Deliver a pointer event.
    Pointer(PointerEvent),
    /// Undo the last change.
    Undo,
    /// Redo the last undone change.
    Redo,
}

/// A script line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    /// 1-based line number.
    pub line: usize,
    /// What was wrong.
    pub message: String,
}

fn parse_tool(args: &[&str]) -> Result<Tool, String> {
    let tool = match args {
        ["axon"] => Tool::Select(Category::Axon),
        ["inner"] => Tool::Select(Category::InnerMyelin),
        ["outer"] => Tool::Select(Category::OuterMyelin),
        ["misc"] => Tool::Select(Category::Misc),
        ["deselect"] => Tool::Deselect,
        ["info"] => Tool::Info,
        ["cut"] => Tool::Cut,
        ["draw"] => Tool::Draw,
        ["erase"] => Tool::Erase,
        ["unmyelinated"] => Tool::Count(UNMYELINATED_GROUP.to_owned()),
        ["myelinated"] => Tool::Count(MYELINATED_GROUP.to_owned()),
        ["count", group @ ..] if !group.is_empty() => Tool::Count(group.join(" ")),
        [key] if key.chars().count() == 1 => key
            .chars()
            .next()
            .and_then(Tool::from_hotkey)
            .ok_or_else(|| format!("unknown hotkey {key:?}"))?,
        _ => return Err(format!("unknown tool {:?}", args.join(" "))),
    };
    Ok(tool)
}

fn parse_point(args: &[&str]) -> Result<(i32, i32), String> {
    let [x, y] = args else {
        return Err(format!("expected `x y`, got {:?}", args.join(" ")));
    };
    let coord = |s: &str| s.parse::<i32>().map_err(|e| format!("bad coordinate {s:?}: {e}"));
    Ok((coord(x)?, coord(y)?))
}

fn pointer(kind: PointerKind, modifiers: Modifiers, args: &[&str]) -> Result<Command, String> {
    let (x, y) = parse_point(args)?;
    Ok(Command::Pointer(PointerEvent::new(kind, x, y, modifiers)))
}

fn parse_line(line: &str) -> Result<Option<Command>, String> {
    let line = line.split('#').next().unwrap_or_default().trim();
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&verb, args)) = words.split_first() else {
        return Ok(None);
    };
    let command = match verb {
        "tool" => Command::Tool(parse_tool(args)?),
        "press" => pointer(PointerKind::Press, Modifiers::NONE, args)?,
        "shift-press" => pointer(PointerKind::Press, Modifiers::SHIFT, args)?,
        "move" => pointer(PointerKind::Move, Modifiers::NONE, args)?,
        "release" => pointer(PointerKind::Release, Modifiers::NONE, args)?,
        "undo" if args.is_empty() => Command::Undo,
        "redo" if args.is_empty() => Command::Redo,
        other => return Err(format!("unknown command {other:?}")),
    };
    Ok(Some(command))
}

/// Parse a whole script.
///
/// # Errors
///
/// Returns the first line that does not parse.
pub fn parse(text: &str) -> Result<Vec<Command>, ParseError> {
    text.lines()
        .enumerate()
        .filter_map(|(i, line)| {
            parse_line(line)
                .map_err(|message| ParseError {
                    line: i + 1,
                    message,
                })
                .transpose()
        })
        .collect()
}

/// Apply `commands` to `editor` in order. Info reports are logged.
pub fn run(editor: &mut Editor, commands: &[Command]) {
    for command in commands {
        match command {
            Command::Tool(tool) => editor.set_tool(tool.clone()),
            Command::Pointer(event) => {
                if let Some(report) = editor.pointer_event(*event) {
                    log::info!("info at ({}, {}): {}", event.at.x, event.at.y, report.message());
                }
            }
            Command::Undo => {
                if !editor.undo() {
                    log::warn!("nothing to undo");
                }
            }
            Command::Redo => {
                if !editor.redo() {
                    log::warn!("nothing to redo");
                }
            }
        }
    }
}
