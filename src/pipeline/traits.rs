//! Collaborator traits for the extraction pipeline.
//!
//! Tagging and lemmatization are black boxes to the extraction engine: the
//! [`Extractor`](super::runner::Extractor) only needs every token to carry a
//! tag and a lemma before lemma groups are built. Implementations are
//! statically dispatched; trait objects work too.

use crate::types::Token;

// ============================================================================
// PosTagger: assigns `CATEGORY[:subtag]` tags
// ============================================================================

/// Part-of-speech tagger.
///
/// # Contract
///
/// - **Input**: every token of a document, in document order, with
///   `is_stopword` / `is_usual` already set.
/// - **Output**: none, `Token::tag` is written in place.
/// - Tags follow the `CATEGORY[:subtag]` shape; see
///   [`Category::from_tag`](crate::types::Category::from_tag) for the
///   recognized categories.
pub trait PosTagger {
    /// Tag all tokens in place.
    fn tag_all(&self, tokens: &mut [Token]);
}

// ============================================================================
// Lemmatizer: assigns lemmas, one token at a time
// ============================================================================

/// Lemmatizer, run on each token after tagging.
///
/// Implementations may use the token's tag; they write `Token::lemma` in
/// place.
pub trait Lemmatizer {
    fn lemmatize(&self, token: &mut Token);
}

/// Lemmatizer that keeps the surface form as lemma.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLemmatizer;

impl Lemmatizer for NoopLemmatizer {
    #[inline]
    fn lemmatize(&self, token: &mut Token) {
        if token.lemma != token.text {
            token.lemma = token.text.clone();
        }
    }
}

impl<T: PosTagger + ?Sized> PosTagger for &T {
    fn tag_all(&self, tokens: &mut [Token]) {
        (**self).tag_all(tokens)
    }
}

impl<T: PosTagger + ?Sized> PosTagger for Box<T> {
    fn tag_all(&self, tokens: &mut [Token]) {
        (**self).tag_all(tokens)
    }
}

impl<L: Lemmatizer + ?Sized> Lemmatizer for &L {
    fn lemmatize(&self, token: &mut Token) {
        (**self).lemmatize(token)
    }
}

impl<L: Lemmatizer + ?Sized> Lemmatizer for Box<L> {
    fn lemmatize(&self, token: &mut Token) {
        (**self).lemmatize(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tokens() -> Vec<Token> {
        vec![
            Token::new("Ministère", 0, 0, 0),
            Token::new("votes", 0, 1, 1),
        ]
    }

    #[test]
    fn test_noop_lemmatizer_keeps_surface_form() {
        let mut token = Token::tagged("votes", "voter", "VCJ", 0, 0, 0);
        NoopLemmatizer.lemmatize(&mut token);
        assert_eq!(token.lemma, "votes");
    }

    /// Custom tagger: every capitalized word is a proper noun.
    struct CapitalTagger;

    impl PosTagger for CapitalTagger {
        fn tag_all(&self, tokens: &mut [Token]) {
            for token in tokens.iter_mut() {
                token.tag = if token.is_title() { "SBP" } else { "SBC" }.to_string();
            }
        }
    }

    #[test]
    fn test_custom_tagger_writes_in_place() {
        let mut tokens = sample_tokens();
        CapitalTagger.tag_all(&mut tokens);
        assert_eq!(tokens[0].tag, "SBP");
        assert_eq!(tokens[1].tag, "SBC");
    }

    #[test]
    fn test_tagger_as_trait_object() {
        let tagger: Box<dyn PosTagger> = Box::new(CapitalTagger);
        let mut tokens = sample_tokens();
        tagger.tag_all(&mut tokens);
        assert_eq!(tokens[0].tag, "SBP");
    }

    #[test]
    fn test_lemmatizer_by_reference() {
        let lemmatizer = NoopLemmatizer;
        let by_ref: &dyn Lemmatizer = &lemmatizer;
        let mut token = Token::tagged("lois", "loi", "SBC:pl", 0, 0, 0);
        by_ref.lemmatize(&mut token);
        assert_eq!(token.lemma, "lois");
    }
}
