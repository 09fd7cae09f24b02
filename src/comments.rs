//! Single-pass removal of comment spans from generated source text.
//!
//! Plain `/* ... */` blocks and `// ...` line comments are dropped. Blocks
//! opened with `/**` are documentation and are copied through untouched.
//! Everything outside a comment is copied verbatim.

/// Where the scanner is relative to comment delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Code,
    LineComment,
    BlockComment,
}

/// The characters visible at one decision point.
///
/// `peek` is only consulted to tell `/*` from `/**`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Window {
    cur: char,
    next: Option<char>,
    peek: Option<char>,
}

/// What a step copies to the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emit {
    Nothing,
    Cur,
    CurAndNext,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Transition {
    state: ScanState,
    emit: Emit,
    /// The step also consumed `next`.
    takes_next: bool,
}

impl Transition {
    const fn single(state: ScanState, emit: Emit) -> Self {
        Self {
            state,
            emit,
            takes_next: false,
        }
    }

    const fn pair(state: ScanState, emit: Emit) -> Self {
        Self {
            state,
            emit,
            takes_next: true,
        }
    }
}

fn transition(state: ScanState, w: Window) -> Transition {
    use ScanState::{BlockComment, Code, LineComment};

    match (state, w.cur, w.next) {
        // `/**` opens a documentation block: keep it as text.
        (Code, '/', Some('*')) if w.peek == Some('*') => Transition::pair(Code, Emit::CurAndNext),
        (Code, '/', Some('*')) => Transition::pair(BlockComment, Emit::Nothing),
        (Code, '/', Some('/')) => Transition::pair(LineComment, Emit::Nothing),
        (Code, _, _) => Transition::single(Code, Emit::Cur),

        (BlockComment, '*', Some('/')) => Transition::pair(Code, Emit::Nothing),
        (BlockComment, _, _) => Transition::single(BlockComment, Emit::Nothing),

        // The terminator belongs to the comment, so the next line is spliced on.
        (LineComment, '\r', Some('\n')) => Transition::pair(Code, Emit::Nothing),
        (LineComment, '\n' | '\r', _) => Transition::single(Code, Emit::Nothing),
        (LineComment, _, _) => Transition::single(LineComment, Emit::Nothing),
    }
}

/// Remove plain block comments and line comments from `text`.
///
/// A removed line comment takes its line terminator with it (`\n`, `\r\n` or
/// a lone `\r`), so the following line is joined to the text before the
/// comment. A comment left open at the end of input swallows the rest.
pub fn remove_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut state = ScanState::Code;
    let mut chars = text.chars();

    while let Some(cur) = chars.next() {
        let mut ahead = chars.clone();
        let window = Window {
            cur,
            next: ahead.next(),
            peek: ahead.next(),
        };

        let step = transition(state, window);
        match step.emit {
            Emit::Nothing => {}
            Emit::Cur => out.push(cur),
            Emit::CurAndNext => {
                out.push(cur);
                out.extend(window.next);
            }
        }
        if step.takes_next {
            chars.next();
        }
        state = step.state;
    }

    out
}
