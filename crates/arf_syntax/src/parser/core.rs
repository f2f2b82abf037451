/// Parser core types and entrypoint.
///
/// This chunk defines the [`Parser`] type and its top-level `parse()` entrypoint.
///
/// ## Notes
/// - This file is `include!`'d into `crate::parser` to keep all parser methods in a
///   single module while avoiding a single "god file".

/// Terminates a token stream that did not come from the lexer.
static FALLBACK_EOF: Token = Token {
    kind: TokenKind::Eof,
    span: Span {
        start: Position { line: 1, column: 1 },
        end: Position { line: 1, column: 1 },
    },
};

/// An own-line `#` comment, candidate documentation for the declaration below it.
struct DocLine {
    line: usize,
    text: String,
}

/// Parser state.
///
/// ## Notes
/// - Comment tokens are split off at construction; the grammar only ever sees significant tokens.
/// - Declarations are written straight into the `file` arena as they are parsed.
pub struct Parser<'a> {
    tokens: Vec<&'a Token>,
    comments: Vec<DocLine>,
    pos: usize,
    errors: Vec<CompileError>,
    file: SourceFile,
}

impl<'a> Parser<'a> {
    /// Create a new parser for a token stream.
    ///
    /// ## Parameters
    /// - `tokens`: Token stream produced by `arf_syntax::lexer`.
    pub fn new(tokens: &'a [Token]) -> Self {
        let mut significant = Vec::with_capacity(tokens.len());
        let mut comments = Vec::new();
        let mut last_code_line = None;

        for token in tokens {
            match &token.kind {
                TokenKind::Comment(text) => {
                    // A comment trailing code on the same line never documents anything.
                    if last_code_line != Some(token.span.start.line) {
                        comments.push(DocLine {
                            line: token.span.start.line,
                            text: text.clone(),
                        });
                    }
                }
                _ => {
                    last_code_line = Some(token.span.end.line);
                    significant.push(token);
                }
            }
        }

        if !matches!(significant.last().map(|t| &t.kind), Some(TokenKind::Eof)) {
            significant.push(&FALLBACK_EOF);
        }

        Self {
            tokens: significant,
            comments,
            pos: 0,
            errors: Vec::new(),
            file: SourceFile::default(),
        }
    }

    /// Parse the entire token stream into a [`SourceFile`].
    ///
    /// Always returns the (possibly partial) file together with every error found. A file with errors is only
    /// good for further error reporting, never for validation.
    pub fn parse(mut self) -> (SourceFile, Vec<CompileError>) {
        self.header();

        while !self.is_at_end() {
            let started_at = self.pos;
            if let Err(e) = self.top_level_item() {
                self.recover(e, started_at);
            }
        }

        (self.file, self.errors)
    }
}
