//! Sections describing the world as a whole

define_aspects! {
    /// Fields of the `physical_world` section, produced by the world seed
    PhysicalAspect {
        Geography => ("geography", "geography"),
        Climate => ("climate", "climate"),
        FloraFauna => ("flora_fauna", "flora_fauna"),
        Resources => ("resources", "resources"),
        History => ("history", "history"),
    }
}

define_aspects! {
    /// Fields of the `culture` section, produced by the cultural tapestry
    CultureAspect {
        SocialStructure => ("social_structure", "social_structure"),
        Governance => ("governance", "governance"),
        Economy => ("economy", "economy"),
        Customs => ("customs", "customs"),
        Traditions => ("traditions", "traditions"),
        Religions => ("religions", "religions"),
        Language => ("language", "language"),
        Art => ("art", "art"),
        Technology => ("technology", "technology"),
    }
}
