//! Splitting of single-string argument lists
//!
//! Launch specifications carry their arguments as one string, the way Windows
//! hands a command-line tail to a new process. Platforms that expect an argv
//! array get the string split with the Windows C runtime rules:
//!
//! - spaces and tabs separate arguments outside double quotes
//! - a double quote toggles quoting and is not part of the argument
//! - `""` inside a quoted section produces a literal `"`
//! - `2n` backslashes before a quote become `n` backslashes and the quote toggles;
//!   `2n + 1` backslashes become `n` backslashes and a literal `"`
//! - backslashes not followed by a quote are literal
//!
//! No shell is involved: `$VAR`, globs, pipes and redirections are passed through
//! untouched.

/// Split an argument string into discrete arguments.
#[must_use]
pub fn split_arguments(arguments: &str) -> Vec<String> {
    let chars: Vec<char> = arguments.chars().collect();
    let mut result = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        while i < chars.len() && is_separator(chars[i]) {
            i += 1;
        }
        if i == chars.len() {
            break;
        }
        result.push(next_argument(&chars, &mut i));
    }

    result
}

fn is_separator(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn next_argument(chars: &[char], i: &mut usize) -> String {
    let mut current = String::new();
    let mut in_quotes = false;

    while *i < chars.len() {
        let c = chars[*i];
        if c == '\\' {
            let mut backslashes = 0;
            while *i < chars.len() && chars[*i] == '\\' {
                backslashes += 1;
                *i += 1;
            }
            if *i < chars.len() && chars[*i] == '"' {
                current.extend(std::iter::repeat_n('\\', backslashes / 2));
                if backslashes % 2 == 1 {
                    current.push('"');
                    *i += 1;
                }
            } else {
                current.extend(std::iter::repeat_n('\\', backslashes));
            }
        } else if c == '"' {
            if in_quotes && chars.get(*i + 1) == Some(&'"') {
                current.push('"');
                *i += 2;
            } else {
                in_quotes = !in_quotes;
                *i += 1;
            }
        } else if is_separator(c) && !in_quotes {
            break;
        } else {
            current.push(c);
            *i += 1;
        }
    }

    current
}
