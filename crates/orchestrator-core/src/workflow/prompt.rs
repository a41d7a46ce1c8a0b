//! Prompt text sent to the reasoning service.

/// Everything the language prompt interpolates.
#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
    pub supported_languages: &'a [&'a str],
    pub context: &'a str,
    pub research: &'a str,
    pub locations: &'a [String],
}

/// Ask which search languages fit the requester, the research and the
/// target countries. The answer must be a bare comma-separated list of
/// 2-letter codes taken from `supported_languages`.
pub fn language_prompt(input: &PromptInput<'_>) -> String {
    format!(
        "You are one step of a larger research project. A Google search will be run for the \
         research below, and your only job is to pick the best languages to filter the search \
         results by, given the context of the person or company asking, the desired research \
         and the countries the results are filtered to. Answer with 2-letter language codes. \
         Respond only with a comma separated list of language codes, nothing else. \
         The codes you can use are: {codes}. context:\"{context}\". research:\"{research}\". \
         countries:\"{countries}\".",
        codes = input.supported_languages.join(","),
        context = input.context,
        research = input.research,
        countries = input.locations.join(","),
    )
}
