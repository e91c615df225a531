#[derive(Clone, PartialEq, Eq, Debug)]
pub enum PosTag {
    Comma,
    Period,
    /// Conjunction, coordinating
    CC,
    /// Cardinal number
    CD,
    /// Determiner
    DT,
    /// Conjunction, subordinating or preposition
    IN,
    /// Adjective
    JJ,
    /// Adjective, comparative
    JJR,
    /// Adjective, superlative
    JJS,
    /// Modal
    MD,
    /// Noun, singular or mass
    NN,
    /// Noun, proper singular
    NNP,
    /// Noun, proper plural
    NNPS,
    /// Noun, plural
    NNS,
    /// Pronoun, personal
    PRP,
    /// Pronoun, possessive
    PRPS,
    /// Adverb
    RB,
    /// Adverb, comparative
    RBR,
    /// Adverb, superlative
    RBS,
    /// Interjection
    UH,
    /// Verb, base form
    VB,
    /// Verb, past tense
    VBD,
    /// Verb, gerund or present participle
    VBG,
    /// Verb, past participle
    VBN,
    /// Verb, non-3rd person singular present
    VBP,
    /// Verb, 3rd person singular present
    VBZ,
    /// Wh-determiner
    WDT,
    /// Wh-pronoun, personal
    WP,
    /// Wh-adverb
    WRB,
    /// Noun phrase (group tag, never carried by a single word)
    NP,
    /// Verb phrase (group tag)
    VP,
    /// Prepositional phrase (group tag)
    PP,
    /// Adjective phrase (group tag)
    ADJP,
    /// Adverb phrase (group tag)
    ADVP,
    /// Sentence (group tag)
    S,
    Other(String),
}

impl PosTag {
    pub fn is_group(&self) -> bool {
        match self {
            PosTag::NP   => true,
            PosTag::VP   => true,
            PosTag::PP   => true,
            PosTag::ADJP => true,
            PosTag::ADVP => true,
            PosTag::S    => true,
            _            => false,
        }
    }

    pub fn is_noun(&self) -> bool {
        match self {
            PosTag::NN   => true,
            PosTag::NNP  => true,
            PosTag::NNPS => true,
            PosTag::NNS  => true,
            _            => false,
        }
    }

    pub fn is_verb(&self) -> bool {
        match self {
            PosTag::VB  => true,
            PosTag::VBD => true,
            PosTag::VBG => true,
            PosTag::VBN => true,
            PosTag::VBP => true,
            PosTag::VBZ => true,
            _           => false,
        }
    }

    pub fn is_adjective(&self) -> bool {
        match self {
            PosTag::JJ  => true,
            PosTag::JJR => true,
            PosTag::JJS => true,
            _           => false,
        }
    }

    pub fn is_adverb(&self) -> bool {
        match self {
            PosTag::RB  => true,
            PosTag::RBR => true,
            PosTag::RBS => true,
            _           => false,
        }
    }
}
