//! Políticas de clasificación de tipos de contenido y de relaciones.
//!
//! Ambas son tablas inmutables construidas una sola vez; no conocen el
//! recorrido del paquete y se pueden probar por separado.

use std::collections::{HashMap, HashSet};

use crate::config::SPOOFED_EXTERNAL_SCHEME;
use crate::threat::ThreatSeverity;

use super::constants::{
    ALLOWED_RELATIONS, ALLOWED_TOP_LEVEL_TYPES, DENIED_RELATIONS, FORBIDDEN_CONTENT_TYPES,
    REMAPPED_CONTENT_TYPES,
};
use super::package::TargetMode;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentTypeVerdict {
    Allowed,
    Forbidden,
    /// Se conserva el contenido y se declara con el tipo indicado.
    Remap(String),
}

/// Tabla de disposición por tipo de contenido.
#[derive(Clone, Debug)]
pub struct ContentTypePolicy {
    forbidden: HashSet<String>,
    remapped: HashMap<String, String>,
    allowed_top_level: HashSet<String>,
}

impl Default for ContentTypePolicy {
    fn default() -> Self {
        Self::new(
            FORBIDDEN_CONTENT_TYPES,
            REMAPPED_CONTENT_TYPES,
            ALLOWED_TOP_LEVEL_TYPES,
        )
    }
}

impl ContentTypePolicy {
    pub fn new<'a, F, R, T>(forbidden: F, remapped: R, allowed_top_level: T) -> Self
    where
        F: IntoIterator<Item = &'a str>,
        R: IntoIterator<Item = (&'a str, &'a str)>,
        T: IntoIterator<Item = &'a str>,
    {
        Self {
            forbidden: forbidden.into_iter().map(str::to_ascii_lowercase).collect(),
            remapped: remapped
                .into_iter()
                .map(|(from, to)| (from.to_ascii_lowercase(), to.to_string()))
                .collect(),
            allowed_top_level: allowed_top_level
                .into_iter()
                .map(str::to_ascii_lowercase)
                .collect(),
        }
    }

    /// Clasifica un tipo de contenido; los parámetros tras `;` no cuentan.
    ///
    /// Una categoría de primer nivel desconocida es `Forbidden` aunque el
    /// subtipo no figure en la tabla.
    pub fn classify(&self, content_type: &str) -> ContentTypeVerdict {
        let media_type = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        let top_level = match media_type.split_once('/') {
            Some((top_level, subtype)) if !top_level.is_empty() && !subtype.is_empty() => {
                top_level
            }
            _ => {
                tracing::error!(content_type, "tipo de contenido mal formado");
                return ContentTypeVerdict::Forbidden;
            }
        };

        if !self.allowed_top_level.contains(top_level) {
            tracing::error!(top_level, "categoría de contenido desconocida");
            return ContentTypeVerdict::Forbidden;
        }

        if self.forbidden.contains(&media_type) {
            return ContentTypeVerdict::Forbidden;
        }

        match self.remapped.get(&media_type) {
            Some(target) => ContentTypeVerdict::Remap(target.clone()),
            None => ContentTypeVerdict::Allowed,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelationshipVerdict {
    Allow,
    /// Tipo en lista negra: contenido activo.
    Deny,
    /// Destino externo, con la severidad del hallazgo.
    Quarantine(ThreatSeverity),
}

/// Listas blanca y negra de tipos de relación más la regla de destinos externos.
#[derive(Clone, Debug)]
pub struct RelationshipPolicy {
    allowed: HashSet<String>,
    denied: HashSet<String>,
    spoofed_scheme: String,
}

impl Default for RelationshipPolicy {
    fn default() -> Self {
        Self::new(ALLOWED_RELATIONS, DENIED_RELATIONS, SPOOFED_EXTERNAL_SCHEME)
    }
}

impl RelationshipPolicy {
    pub fn new<'a, A, D>(allowed: A, denied: D, spoofed_scheme: &str) -> Self
    where
        A: IntoIterator<Item = &'a str>,
        D: IntoIterator<Item = &'a str>,
    {
        let denied: HashSet<String> = denied.into_iter().map(str::to_ascii_lowercase).collect();
        let allowed = allowed
            .into_iter()
            .map(str::to_ascii_lowercase)
            .filter(|relation| !denied.contains(relation))
            .collect();

        Self {
            allowed,
            denied,
            spoofed_scheme: spoofed_scheme.to_string(),
        }
    }

    pub fn with_spoofed_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.spoofed_scheme = scheme.into();
        self
    }

    /// Reglas en orden: lista blanca, lista negra, destino externo, resto permitido.
    pub fn classify(
        &self,
        relationship_type: &str,
        target_mode: TargetMode,
        target_scheme: Option<&str>,
    ) -> RelationshipVerdict {
        let relationship_type = relationship_type.to_ascii_lowercase();

        if self.allowed.contains(&relationship_type) {
            return RelationshipVerdict::Allow;
        }

        if self.denied.contains(&relationship_type) {
            return RelationshipVerdict::Deny;
        }

        if target_mode == TargetMode::External {
            // Referencia interna disfrazada de externa
            let spoofed = target_scheme
                .is_some_and(|scheme| scheme.eq_ignore_ascii_case(&self.spoofed_scheme));
            let severity = if spoofed {
                ThreatSeverity::Extreme
            } else {
                ThreatSeverity::High
            };
            return RelationshipVerdict::Quarantine(severity);
        }

        RelationshipVerdict::Allow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::constants::{
        ATTACHED_TEMPLATE_REL, HYPERLINK_REL, IMAGE_REL, MAIN_DOCM, MAIN_DOCX, MAIN_XLAM,
        MAIN_XLSX, OLE_OBJECT_REL, OPENXML_ACTIVEX, OPENXML_ACTIVEX_XML, PACKAGE, VBA_DATA,
        VBA_PROJECT, VBA_PROJECT_REL,
    };

    #[test]
    fn forbidden_content_types_match_case_insensitively() {
        let policy = ContentTypePolicy::default();
        assert_eq!(policy.classify(VBA_PROJECT), ContentTypeVerdict::Forbidden);
        assert_eq!(
            policy.classify("Application/VND.ms-word.vbaData+XML"),
            ContentTypeVerdict::Forbidden
        );
        assert_eq!(
            policy.classify(&format!("{}; charset=utf-8", VBA_DATA)),
            ContentTypeVerdict::Forbidden
        );
    }

    #[test]
    fn embedded_packages_and_openxml_activex_are_forbidden() {
        let policy = ContentTypePolicy::default();
        for content_type in [PACKAGE, OPENXML_ACTIVEX, OPENXML_ACTIVEX_XML] {
            assert_eq!(policy.classify(content_type), ContentTypeVerdict::Forbidden);
        }
    }

    #[test]
    fn unknown_top_level_category_is_forbidden() {
        let policy = ContentTypePolicy::default();
        assert_eq!(policy.classify("text/xml"), ContentTypeVerdict::Forbidden);
        assert_eq!(policy.classify("x-custom/thing"), ContentTypeVerdict::Forbidden);
        assert_eq!(policy.classify("application"), ContentTypeVerdict::Forbidden);
        assert_eq!(policy.classify("/xml"), ContentTypeVerdict::Forbidden);
    }

    #[test]
    fn unlisted_subtypes_of_known_categories_are_allowed() {
        let policy = ContentTypePolicy::default();
        assert_eq!(policy.classify("image/x-brand-new"), ContentTypeVerdict::Allowed);
        assert_eq!(policy.classify("video/mp4"), ContentTypeVerdict::Allowed);
        assert_eq!(policy.classify("audio/mpeg"), ContentTypeVerdict::Allowed);
        assert_eq!(policy.classify(MAIN_DOCX), ContentTypeVerdict::Allowed);
    }

    #[test]
    fn macro_enabled_main_parts_are_remapped() {
        let policy = ContentTypePolicy::default();
        assert_eq!(
            policy.classify(MAIN_DOCM),
            ContentTypeVerdict::Remap(MAIN_DOCX.to_string())
        );
        assert_eq!(
            policy.classify(MAIN_XLAM),
            ContentTypeVerdict::Remap(MAIN_XLSX.to_string())
        );
    }

    #[test]
    fn allow_list_wins_over_external_target() {
        let policy = RelationshipPolicy::default();
        assert_eq!(
            policy.classify(HYPERLINK_REL, TargetMode::External, Some("https")),
            RelationshipVerdict::Allow
        );
    }

    #[test]
    fn deny_list_wins_over_external_target() {
        let policy = RelationshipPolicy::default();
        assert_eq!(
            policy.classify(VBA_PROJECT_REL, TargetMode::Internal, None),
            RelationshipVerdict::Deny
        );
        assert_eq!(
            policy.classify(&OLE_OBJECT_REL.to_uppercase(), TargetMode::External, Some("file")),
            RelationshipVerdict::Deny
        );
    }

    #[test]
    fn external_targets_are_quarantined() {
        let policy = RelationshipPolicy::default();
        assert_eq!(
            policy.classify(ATTACHED_TEMPLATE_REL, TargetMode::External, Some("https")),
            RelationshipVerdict::Quarantine(ThreatSeverity::High)
        );
        assert_eq!(
            policy.classify(IMAGE_REL, TargetMode::External, None),
            RelationshipVerdict::Quarantine(ThreatSeverity::High)
        );
        assert_eq!(
            policy.classify(IMAGE_REL, TargetMode::External, Some("ooxWord")),
            RelationshipVerdict::Quarantine(ThreatSeverity::Extreme)
        );
        assert_eq!(
            policy.classify(IMAGE_REL, TargetMode::Internal, None),
            RelationshipVerdict::Allow
        );
    }

    #[test]
    fn spoofed_scheme_is_configurable() {
        let policy = RelationshipPolicy::default().with_spoofed_scheme("evil");
        assert_eq!(
            policy.classify(IMAGE_REL, TargetMode::External, Some("EVIL")),
            RelationshipVerdict::Quarantine(ThreatSeverity::Extreme)
        );
        assert_eq!(
            policy.classify(IMAGE_REL, TargetMode::External, Some("ooxWord")),
            RelationshipVerdict::Quarantine(ThreatSeverity::High)
        );
    }

    #[test]
    fn overlapping_tables_keep_deny_precedence() {
        let policy = RelationshipPolicy::new([VBA_PROJECT_REL], [VBA_PROJECT_REL], "ooxWord");
        assert_eq!(
            policy.classify(VBA_PROJECT_REL, TargetMode::Internal, None),
            RelationshipVerdict::Deny
        );
    }
}
