use std::fs;
use std::path::Path;

use crate::error::LoadError;

/// Parses LS-8 program text: one binary word per line, `#` starts a comment,
/// blank and comment-only lines are skipped.
pub fn parse_program(source: &str) -> Result<Vec<u8>, LoadError> {
    let mut program = Vec::new();
    for (index, line) in source.lines().enumerate() {
        let text = match line.split_once('#') {
            Some((code, _comment)) => code,
            None => line,
        }
        .trim();

        if text.is_empty() {
            continue;
        }

        program.push(parse_word(text).ok_or_else(|| LoadError::Malformed {
            line: index + 1,
            text: text.to_string(),
        })?);
    }
    Ok(program)
}

fn parse_word(text: &str) -> Option<u8> {
    if text.len() > 8 || !text.bytes().all(|b| b == b'0' || b == b'1') {
        return None;
    }
    u8::from_str_radix(text, 2).ok()
}

pub fn load_file(path: &Path) -> Result<Vec<u8>, LoadError> {
    let source = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source: source,
    })?;
    let program = parse_program(&source)?;
    log::debug!("loaded {} words from {}", program.len(), path.display());
    Ok(program)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_strips_comments_and_blank_lines() {
        let source = "\
# print8.ls8
10000010 # LDI R0,8
00000000

00001000
01000111 # PRN R0
00000000
00000001 # HLT
";
        let program = parse_program(source).unwrap();
        assert_eq!(
            program,
            vec![0b1000_0010, 0, 8, 0b0100_0111, 0, 0b0000_0001]
        );
    }

    #[test]
    fn test_tolerates_whitespace_and_crlf() {
        let program = parse_program("  10100010\t# MUL\r\n\r\n00000001\r\n").unwrap();
        assert_eq!(program, vec![0b1010_0010, 1]);
    }

    #[test]
    fn test_rejects_malformed_words() {
        let err = parse_program("00000001\n10000012\n").unwrap_err();
        match err {
            LoadError::Malformed { line, text } => {
                assert_eq!(line, 2);
                assert_eq!(text, "10000012");
            }
            other => panic!("unexpected error {:?}", other),
        }

        assert!(parse_program("100000001\n").is_err());
        assert!(parse_program("+1\n").is_err());
    }

    #[test]
    fn test_empty_source() {
        assert!(parse_program("").unwrap().is_empty());
        assert!(parse_program("# nothing here\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_missing_file() {
        let err = load_file(Path::new("does/not/exist.ls8")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
