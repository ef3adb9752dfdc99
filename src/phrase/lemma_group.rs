//! Lemma groups
//!
//! A lemma group gathers every occurrence of one lemma with one coarse tag
//! inside a document. Groups are created lazily while tokens are attached,
//! through a get-or-create registry keyed by `(lemma, coarse tag)`.

use crate::types::{coarse_tag, Category, Token};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Handle of a lemma group inside its document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LemmaGroupId(pub u32);

impl LemmaGroupId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// All occurrences of a `(lemma, coarse tag)` pair in a document
#[derive(Debug, Clone)]
pub struct LemmaGroup {
    id: LemmaGroupId,
    lemma: String,
    coarse_tag: String,
    /// Token indices, in document order
    occurrences: Vec<usize>,
    /// Token index of the most frequent surface form
    main_occurrence: usize,
}

impl LemmaGroup {
    /// Create a group with its first occurrence
    fn new(id: LemmaGroupId, lemma: &str, coarse_tag: &str, token_idx: usize) -> Self {
        Self {
            id,
            lemma: lemma.to_string(),
            coarse_tag: coarse_tag.to_string(),
            occurrences: vec![token_idx],
            main_occurrence: token_idx,
        }
    }

    pub fn id(&self) -> LemmaGroupId {
        self.id
    }

    pub fn lemma(&self) -> &str {
        &self.lemma
    }

    pub fn coarse_tag(&self) -> &str {
        &self.coarse_tag
    }

    /// Token indices of every occurrence
    pub fn occurrences(&self) -> &[usize] {
        &self.occurrences
    }

    /// Number of occurrences
    pub fn count(&self) -> usize {
        self.occurrences.len()
    }

    /// Token carrying the most frequent surface form of the group
    pub fn main_occurrence<'t>(&self, tokens: &'t [Token]) -> &'t Token {
        &tokens[self.main_occurrence]
    }

    /// Surface form of the main occurrence
    pub fn text<'t>(&self, tokens: &'t [Token]) -> &'t str {
        &self.main_occurrence(tokens).text
    }

    pub fn category(&self, tokens: &[Token]) -> Category {
        self.main_occurrence(tokens).category()
    }

    pub fn is_title(&self, tokens: &[Token]) -> bool {
        self.main_occurrence(tokens).is_title()
    }

    pub fn is_valid(&self, tokens: &[Token]) -> bool {
        self.main_occurrence(tokens).has_meaning()
    }

    pub fn is_valid_alone(&self, tokens: &[Token]) -> bool {
        self.main_occurrence(tokens).has_meaning_alone()
    }

    /// Valid, and frequent (more than two occurrences) or a title
    pub fn has_interest(&self, tokens: &[Token]) -> bool {
        self.is_valid(tokens) && (self.count() > 2 || self.is_title(tokens))
    }

    /// Valid alone, and at least as frequent as the document's lexical
    /// diversity ratio, or a title
    pub fn has_interest_alone(&self, tokens: &[Token], lexical_diversity: f64) -> bool {
        self.is_valid_alone(tokens)
            && (self.count() as f64 >= lexical_diversity || self.is_title(tokens))
    }

    /// Pick the most frequent surface form; ties go to the first encountered
    fn elect_main_occurrence(&mut self, tokens: &[Token]) {
        // (surface form, count, first token index), in first-seen order
        let mut forms: Vec<(&str, usize, usize)> = Vec::new();
        for &idx in &self.occurrences {
            let text = tokens[idx].text.as_str();
            match forms.iter_mut().find(|(form, _, _)| *form == text) {
                Some(entry) => entry.1 += 1,
                None => forms.push((text, 1, idx)),
            }
        }

        let mut best = forms[0];
        for &form in &forms[1..] {
            if form.1 > best.1 {
                best = form;
            }
        }
        self.main_occurrence = best.2;
    }
}

/// Get-or-create registry of the lemma groups of one document
#[derive(Debug, Default)]
pub struct LemmaGroupRegistry {
    /// Maps (lemma, coarse tag) -> group ID
    key_to_id: FxHashMap<(String, String), LemmaGroupId>,
    /// Group storage
    groups: Vec<LemmaGroup>,
    /// Token index -> group ID
    token_groups: Vec<LemmaGroupId>,
}

impl LemmaGroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group every token, then elect each group's main occurrence
    pub fn from_tokens(tokens: &[Token]) -> Self {
        let mut registry = Self::new();
        for (idx, token) in tokens.iter().enumerate() {
            registry.attach(idx, token);
        }
        registry.seal(tokens);
        registry
    }

    /// Return the group for `(lemma, coarse tag)`, creating it with
    /// `token_idx` as first occurrence when it doesn't exist yet
    fn get_or_create(
        &mut self,
        lemma: &str,
        coarse_tag: &str,
        token_idx: usize,
    ) -> (LemmaGroupId, bool) {
        let key = (lemma.to_string(), coarse_tag.to_string());
        if let Some(&id) = self.key_to_id.get(&key) {
            return (id, false);
        }

        let id = LemmaGroupId(self.groups.len() as u32);
        self.key_to_id.insert(key, id);
        self.groups
            .push(LemmaGroup::new(id, lemma, coarse_tag, token_idx));
        (id, true)
    }

    /// Attach a token (with its index in the document) to its group
    fn attach(&mut self, token_idx: usize, token: &Token) -> LemmaGroupId {
        debug_assert_eq!(token_idx, self.token_groups.len());
        let (id, created) = self.get_or_create(&token.lemma, coarse_tag(&token.tag), token_idx);
        if !created {
            self.groups[id.index()].occurrences.push(token_idx);
        }
        self.token_groups.push(id);
        id
    }

    fn seal(&mut self, tokens: &[Token]) {
        for group in &mut self.groups {
            group.elect_main_occurrence(tokens);
        }
    }

    pub fn get(&self, id: LemmaGroupId) -> &LemmaGroup {
        &self.groups[id.index()]
    }

    /// Group of the token at `token_idx`
    pub fn group_of(&self, token_idx: usize) -> LemmaGroupId {
        self.token_groups[token_idx]
    }

    /// Look a group up without creating it
    pub fn find(&self, lemma: &str, coarse_tag: &str) -> Option<LemmaGroupId> {
        self.key_to_id
            .get(&(lemma.to_string(), coarse_tag.to_string()))
            .copied()
    }

    /// Iterate over groups in creation order
    pub fn iter(&self) -> impl Iterator<Item = &LemmaGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
