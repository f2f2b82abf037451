/// Parse a token stream, returning the (possibly partial) [`SourceFile`] together with every parse error.
///
/// The partial file is only meant for further error reporting; callers must not validate a file that came back
/// with errors.
///
/// ## Parameters
/// - `tokens`: Token stream produced by `arf_syntax::lexer`. Comment tokens are allowed.
#[tracing::instrument(skip_all, fields(token_count = tokens.len()))]
pub fn parse_file(tokens: &[Token]) -> (SourceFile, Vec<CompileError>) {
    let (file, errors) = Parser::new(tokens).parse();
    tracing::debug!(
        structs = file.structs.len(),
        enums = file.enums.len(),
        services = file.services.len(),
        errors = errors.len(),
        "parsed file"
    );
    (file, errors)
}

/// Parse a token stream into a [`SourceFile`].
///
/// ## Errors
/// Returns `Err(Vec<CompileError>)` if parsing reported anything.
pub fn parse(tokens: &[Token]) -> Result<SourceFile, Vec<CompileError>> {
    let (file, errors) = parse_file(tokens);
    if errors.is_empty() { Ok(file) } else { Err(errors) }
}
