//! Scenario tests that run the indexing pipeline and the QA engine together
//! over the in-memory index, the trigram embedder and stub completion clients.

mod support;
