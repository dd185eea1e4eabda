//! Prompt input parsing.
//!
//! A plain line is a chat message. Lines starting with `/` are commands;
//! `//` sends a chat message that starts with a single `/`.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Send a chat message
    Chat(String),
    /// Replace the whole document (`\n` and `\t` are unescaped)
    Code(String),
    /// Replace the whole document with a file's contents
    Load(PathBuf),
    /// Change the document language
    Lang(String),
    /// Ask the server for a fresh snapshot
    State,
    /// Print the current document
    Show,
    /// Print the users in the room
    Users,
    Help,
    Unknown(String),
}

/// Parse one prompt line; `None` for a blank line
pub fn parse(line: &str) -> Option<Command> {
    let line = line.trim_end_matches(&['\r', '\n'][..]);
    if line.trim().is_empty() {
        return None;
    }

    if let Some(escaped) = line.strip_prefix("//") {
        return Some(Command::Chat(format!("/{}", escaped)));
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Some(Command::Chat(line.to_string()));
    };

    let (name, arg) = match rest.split_once(' ') {
        Some((name, arg)) => (name, arg),
        None => (rest, ""),
    };

    let command = match (name, arg.trim()) {
        ("code", _) => Command::Code(unescape(arg)),
        ("load", path) if !path.is_empty() => Command::Load(PathBuf::from(path)),
        ("lang", tag) if !tag.is_empty() => Command::Lang(tag.to_string()),
        ("state", _) => Command::State,
        ("show", _) => Command::Show,
        ("users", _) => Command::Users,
        ("help", _) => Command::Help,
        _ => Command::Unknown(line.to_string()),
    };
    Some(command)
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

pub const HELP: &str = "\
Commands:
  <text>          send a chat message
  //<text>        send a chat message starting with '/'
  /code <text>    replace the document (\\n for newline, \\t for tab)
  /load <path>    replace the document with a file
  /lang <tag>     change the document language
  /state          request a fresh room snapshot
  /show           print the document
  /users          list users in the room
  /help           show this help
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_line_is_chat() {
        // テスト項目: スラッシュで始まらない行はチャットになる
        // given (前提条件):
        let line = "hello there";

        // when (操作):
        let result = parse(line);

        // then (期待する結果):
        assert_eq!(result, Some(Command::Chat("hello there".to_string())));
    }

    #[test]
    fn test_blank_line_is_ignored() {
        // テスト項目: 空行は何もしない
        // given (前提条件):
        let line = "   ";

        // when (操作):
        let result = parse(line);

        // then (期待する結果):
        assert_eq!(result, None);
    }

    #[test]
    fn test_double_slash_escapes_chat() {
        // テスト項目: `//` で始まる行は `/` 始まりのチャットになる
        // given (前提条件):
        let line = "//shrug";

        // when (操作):
        let result = parse(line);

        // then (期待する結果):
        assert_eq!(result, Some(Command::Chat("/shrug".to_string())));
    }

    #[test]
    fn test_code_command_unescapes_newlines() {
        // テスト項目: /code の本文は \n と \t が展開される
        // given (前提条件):
        let line = r"/code def f():\n\treturn 1";

        // when (操作):
        let result = parse(line);

        // then (期待する結果):
        assert_eq!(
            result,
            Some(Command::Code("def f():\n\treturn 1".to_string()))
        );
    }

    #[test]
    fn test_code_without_text_clears_document() {
        // テスト項目: 本文の無い /code は空のドキュメントになる
        // given (前提条件):
        let line = "/code";

        // when (操作):
        let result = parse(line);

        // then (期待する結果):
        assert_eq!(result, Some(Command::Code(String::new())));
    }

    #[test]
    fn test_lang_and_load_require_argument() {
        // テスト項目: 引数の無い /lang と /load は不明なコマンドになる
        // given (前提条件):
        let lang = "/lang";
        let load = "/load  ";

        // when (操作):
        let lang_result = parse(lang);
        let load_result = parse(load);

        // then (期待する結果):
        assert_eq!(lang_result, Some(Command::Unknown("/lang".to_string())));
        assert_eq!(load_result, Some(Command::Unknown("/load  ".to_string())));
    }

    #[test]
    fn test_simple_commands() {
        // テスト項目: 引数を取らないコマンドが解釈される
        // given (前提条件):
        let lines = ["/state", "/show", "/users", "/help", "/lang rust", "/load a.py"];

        // when (操作):
        let results: Vec<_> = lines.iter().map(|line| parse(line)).collect();

        // then (期待する結果):
        assert_eq!(
            results,
            vec![
                Some(Command::State),
                Some(Command::Show),
                Some(Command::Users),
                Some(Command::Help),
                Some(Command::Lang("rust".to_string())),
                Some(Command::Load(PathBuf::from("a.py"))),
            ]
        );
    }
}
