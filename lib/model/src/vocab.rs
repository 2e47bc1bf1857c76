//! Vocabularies used by Europeana Data Model (EDM) records.

pub use oxrdf::vocab::{rdf, xsd};

pub mod dc {
    //! [Dublin Core Metadata Element Set](https://www.dublincore.org/specifications/dublin-core/dces/) vocabulary.
    use oxrdf::NamedNodeRef;

    pub const NAMESPACE: &str = "http://purl.org/dc/elements/1.1/";

    pub const CREATOR: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://purl.org/dc/elements/1.1/creator");
    pub const DATE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://purl.org/dc/elements/1.1/date");
    pub const DESCRIPTION: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://purl.org/dc/elements/1.1/description");
    pub const LANGUAGE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://purl.org/dc/elements/1.1/language");
    pub const TITLE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://purl.org/dc/elements/1.1/title");
    pub const TYPE: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://purl.org/dc/elements/1.1/type");
}

pub mod dcterms {
    //! [DCMI Metadata Terms](https://www.dublincore.org/specifications/dublin-core/dcmi-terms/) vocabulary.
    use oxrdf::NamedNodeRef;

    pub const NAMESPACE: &str = "http://purl.org/dc/terms/";

    pub const CREATED: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://purl.org/dc/terms/created");
}

pub mod edm {
    //! [Europeana Data Model](https://pro.europeana.eu/page/edm-documentation) vocabulary.
    use oxrdf::NamedNodeRef;

    pub const NAMESPACE: &str = "http://www.europeana.eu/schemas/edm/";

    pub const COUNTRY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.europeana.eu/schemas/edm/country");
    pub const DATA_PROVIDER: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.europeana.eu/schemas/edm/dataProvider");
    /// Set to `"false"` on the provider proxy and to `"true"` on the proxy Europeana adds itself.
    pub const EUROPEANA_PROXY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.europeana.eu/schemas/edm/europeanaProxy");
    pub const IS_SHOWN_BY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.europeana.eu/schemas/edm/isShownBy");
    pub const PROVIDER: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.europeana.eu/schemas/edm/provider");
    pub const RIGHTS: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.europeana.eu/schemas/edm/rights");
}

pub mod ore {
    //! [OAI Object Reuse and Exchange](https://www.openarchives.org/ore/1.0/vocabulary) vocabulary.
    use oxrdf::NamedNodeRef;

    pub const NAMESPACE: &str = "http://www.openarchives.org/ore/terms/";

    pub const PROXY_FOR: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.openarchives.org/ore/terms/proxyFor");
    pub const PROXY_IN: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.openarchives.org/ore/terms/proxyIn");
}

pub mod skos {
    //! [SKOS](https://www.w3.org/TR/skos-reference/) vocabulary.
    use oxrdf::NamedNodeRef;

    pub const NAMESPACE: &str = "http://www.w3.org/2004/02/skos/core#";

    pub const PREF_LABEL: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2004/02/skos/core#prefLabel");
}

/// Prefixes written at the top of serialized graphs.
pub const PREFIXES: [(&str, &str); 6] = [
    ("dc", dc::NAMESPACE),
    ("dcterms", dcterms::NAMESPACE),
    ("edm", edm::NAMESPACE),
    ("ore", ore::NAMESPACE),
    ("skos", skos::NAMESPACE),
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
];
