//! Phase 4: Ordinal relationship validation.

use std::collections::BTreeSet;

use crate::base::{Name, Side};
use crate::hir::errors::AnalysisError;
use crate::hir::model::OrdinalInfo;
use crate::hir::resolver::ModelResolver;

/// Check every `O<n>` relationship and record its ranking metadata.
pub(crate) fn validate_ordinals(ctx: &mut ModelResolver<'_>) -> Result<(), AnalysisError> {
    let mut found = Vec::new();
    for rel in ctx.relationships.values().filter(|r| r.is_ordinal()) {
        // Reflexivity was checked at merge time.
        let Some(owner) = rel.perspective(Side::P).map(|p| p.class.clone()) else {
            continue;
        };
        let Some(class) = ctx.classes.get(&owner) else {
            continue;
        };

        let bound: Vec<Name> = class
            .all_attributes()
            .filter(|a| a.relationships.contains(&rel.rnum))
            .map(|a| a.name.clone())
            .collect();
        let bound_set: BTreeSet<&Name> = bound.iter().collect();

        let mut groups = class
            .identifiers
            .iter()
            .filter(|(_, members)| members.iter().collect::<BTreeSet<_>>() == bound_set)
            .map(|(group, _)| group);
        let id_group = match (groups.next(), groups.next()) {
            (Some(group), None) => group,
            _ => {
                return Err(AnalysisError::OrdinalIdentifierMismatch {
                    rnum: rel.rnum.clone(),
                    class: owner,
                    attributes: bound.clone(),
                });
            }
        };

        let ranking: Vec<Name> = class
            .all_attributes()
            .filter(|a| a.ranking.as_ref() == Some(&rel.rnum))
            .map(|a| a.name.clone())
            .collect();
        if ranking.len() != 1 {
            return Err(AnalysisError::OrdinalRankingAttribute {
                rnum: rel.rnum.clone(),
                class: owner,
                found: ranking,
            });
        }
        let ranking_attribute = &ranking[0];

        tracing::trace!(
            "[ORD] {} on '{}' via {} ranked by '{}'",
            rel.rnum,
            owner,
            id_group,
            ranking_attribute
        );
        found.push(OrdinalInfo {
            rnum: rel.rnum.clone(),
            class: owner.clone(),
            id_group,
            ranking_attribute: ranking_attribute.clone(),
            ascending_phrase: rel.phrase(Side::P).cloned().unwrap_or_default(),
            descending_phrase: rel.phrase(Side::T).cloned().unwrap_or_default(),
        });
    }

    for info in found {
        ctx.ordinals.insert(info.rnum.clone(), info);
    }
    tracing::debug!("[ORD] {} ordinal relationships", ctx.ordinals.len());
    Ok(())
}
