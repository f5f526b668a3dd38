//! XBEL relationship and function vocabularies.
//!
//! Predicate and function base terms are matched against these closed sets.
//! Names are accepted in the XBEL attribute spelling (`directlyIncreases`) and
//! in constant spelling (`DIRECTLY_INCREASES`); matching ignores case and
//! underscores.

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

macro_rules! vocabulary {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $xbel:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Spelling used in XBEL documents.
            pub fn as_xbel(self) -> &'static str {
                match self {
                    $($name::$variant => $xbel),+
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                let wanted = normalize(name.trim());
                Self::ALL
                    .iter()
                    .copied()
                    .find(|candidate| normalize(candidate.as_xbel()) == wanted)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_xbel())
            }
        }
    };
}

vocabulary! {
    /// Statement relationships.
    Relationship {
        Increases => "increases",
        Decreases => "decreases",
        DirectlyIncreases => "directlyIncreases",
        DirectlyDecreases => "directlyDecreases",
        CausesNoChange => "causesNoChange",
        PositiveCorrelation => "positiveCorrelation",
        NegativeCorrelation => "negativeCorrelation",
        TranslatedTo => "translatedTo",
        TranscribedTo => "transcribedTo",
        IsA => "isA",
        SubProcessOf => "subProcessOf",
        RateLimitingStepOf => "rateLimitingStepOf",
        BiomarkerFor => "biomarkerFor",
        PrognosticBiomarkerFor => "prognosticBiomarkerFor",
        Orthologous => "orthologous",
        Analogous => "analogous",
        Association => "association",
        HasMembers => "hasMembers",
        HasComponents => "hasComponents",
        HasMember => "hasMember",
        HasComponent => "hasComponent",
    }
}

vocabulary! {
    /// Term functions.
    BelFunction {
        Abundance => "abundance",
        BiologicalProcess => "biologicalProcess",
        CatalyticActivity => "catalyticActivity",
        CellSecretion => "cellSecretion",
        CellSurfaceExpression => "cellSurfaceExpression",
        ChaperoneActivity => "chaperoneActivity",
        ComplexAbundance => "complexAbundance",
        CompositeAbundance => "compositeAbundance",
        Degradation => "degradation",
        Fusion => "fusion",
        GeneAbundance => "geneAbundance",
        GtpBoundActivity => "gtpBoundActivity",
        KinaseActivity => "kinaseActivity",
        List => "list",
        MicroRnaAbundance => "microRNAAbundance",
        MolecularActivity => "molecularActivity",
        Pathology => "pathology",
        PeptidaseActivity => "peptidaseActivity",
        PhosphataseActivity => "phosphataseActivity",
        Products => "products",
        ProteinAbundance => "proteinAbundance",
        ProteinModification => "proteinModification",
        Reactants => "reactants",
        Reaction => "reaction",
        RibosylationActivity => "ribosylationActivity",
        RnaAbundance => "rnaAbundance",
        Substitution => "substitution",
        TranscriptionalActivity => "transcriptionalActivity",
        Translocation => "translocation",
        TransportActivity => "transportActivity",
        Truncation => "truncation",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relationship_accepts_both_spellings() {
        assert_eq!(
            Relationship::from_name("directlyIncreases"),
            Some(Relationship::DirectlyIncreases)
        );
        assert_eq!(
            Relationship::from_name("DIRECTLY_INCREASES"),
            Some(Relationship::DirectlyIncreases)
        );
        assert_eq!(Relationship::from_name("controls-state-change-of"), None);
    }

    #[test]
    fn function_round_trips_through_xbel_spelling() {
        for f in BelFunction::ALL {
            assert_eq!(BelFunction::from_name(f.as_xbel()), Some(*f));
        }
        assert_eq!(BelFunction::from_name("MICRO_RNA_ABUNDANCE"), Some(BelFunction::MicroRnaAbundance));
    }
}
