use std::io::Write;

use crate::bleach::Bleach;
use crate::config::{BleachConfig, PackageLimits};
use crate::error::{BleachError, Result};
use crate::session::BleachSession;
use crate::threat::{Threat, ThreatAction, ThreatSeverity, ThreatType};

use super::package::{Package, RelationshipSource};
use super::policy::{
    ContentTypePolicy, ContentTypeVerdict, RelationshipPolicy, RelationshipVerdict,
};

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Sanea documentos OOXML filtrando partes y relaciones por tipo.
///
/// Cada parte y cada relación declara un tipo: si corresponde a una macro, un
/// objeto OLE o un control ActiveX se elimina; las relaciones externas se
/// eliminan siempre y los documentos principales con macros se declaran con su
/// equivalente sin macros.
#[derive(Clone, Debug, Default)]
pub struct OoxmlBleach {
    content_types: ContentTypePolicy,
    relationships: RelationshipPolicy,
    limits: PackageLimits,
}

impl OoxmlBleach {
    pub fn new(
        content_types: ContentTypePolicy,
        relationships: RelationshipPolicy,
        limits: PackageLimits,
    ) -> Self {
        Self {
            content_types,
            relationships,
            limits,
        }
    }

    pub fn from_config(config: &BleachConfig) -> Self {
        Self::new(
            ContentTypePolicy::default(),
            RelationshipPolicy::default().with_spoofed_scheme(&config.spoofed_external_scheme),
            config.limits,
        )
    }

    /// Aplica ambas políticas sobre un paquete ya abierto.
    pub fn sanitize_package(&self, package: &mut Package, session: &mut BleachSession) {
        tracing::trace!("saneando paquete");

        self.sanitize_relationships(package, &RelationshipSource::Package, session);

        for name in package.part_names() {
            if package.contains_part(&name) {
                self.sanitize_part(package, &name, session);
            }
        }

        for name in package.part_names() {
            let source = RelationshipSource::Part(name);
            self.sanitize_relationships(package, &source, session);
        }
    }

    fn sanitize_part(&self, package: &mut Package, name: &str, session: &mut BleachSession) {
        let Some(part) = package.part(name) else {
            return;
        };
        let Some(content_type) = part.content_type().map(str::to_string) else {
            return;
        };
        let size = part.data().len();
        tracing::debug!(part = name, content_type = %content_type, "tipo de contenido");

        match self.content_types.classify(&content_type) {
            ContentTypeVerdict::Allowed => {}
            ContentTypeVerdict::Forbidden => {
                tracing::debug!(
                    part = name,
                    content_type = %content_type,
                    size,
                    "tipo de contenido sospechoso eliminado"
                );
                package.remove_part(name);

                session.record_threat(
                    Threat::builder(ThreatType::ActiveContent)
                        .severity(ThreatSeverity::High)
                        .action(ThreatAction::Remove)
                        .location(name)
                        .details(format!("Forbidden content type: {}", content_type))
                        .build(),
                );
            }
            ContentTypeVerdict::Remap(new_content_type) => {
                package.set_content_type(name, &new_content_type);
                tracing::debug!(
                    part = name,
                    from = %content_type,
                    to = %new_content_type,
                    "tipo de contenido reasignado"
                );

                session.record_threat(
                    Threat::builder(ThreatType::UnrecognizedContent)
                        .severity(ThreatSeverity::Low)
                        .action(ThreatAction::Disarm)
                        .location(name)
                        .details(format!("Remapped content type: {}", content_type))
                        .build(),
                );
            }
        }
    }

    fn sanitize_relationships(
        &self,
        package: &mut Package,
        source: &RelationshipSource,
        session: &mut BleachSession,
    ) {
        let relationships = package.relationships(source).to_vec();

        for relationship in relationships {
            let relationship_type = relationship.relationship_type.as_str();
            tracing::debug!(
                relationship_type,
                source = source.name(),
                target = %relationship.target,
                "relación encontrada"
            );

            let verdict = self.relationships.classify(
                relationship_type,
                relationship.target_mode,
                relationship.target_scheme(),
            );

            let threat = match verdict {
                RelationshipVerdict::Allow => continue,
                RelationshipVerdict::Deny => Threat::builder(ThreatType::ActiveContent)
                    .severity(ThreatSeverity::High)
                    .action(ThreatAction::Remove)
                    .location(source.name())
                    .details(format!(
                        "Blacklisted relationship type: {}",
                        relationship_type
                    ))
                    .build(),
                RelationshipVerdict::Quarantine(severity) => {
                    tracing::debug!(
                        source = source.name(),
                        target = %relationship.target,
                        relationship_type,
                        "relación externa encontrada"
                    );
                    Threat::builder(ThreatType::ExternalContent)
                        .severity(severity)
                        .action(ThreatAction::Remove)
                        .location(source.name())
                        .details(format!(
                            "External relationship of type: {}",
                            relationship_type
                        ))
                        .build()
                }
            };

            package.remove_relationship(source, &relationship.id);
            session.record_threat(threat);
        }
    }
}

impl Bleach for OoxmlBleach {
    fn handles_magic(&self, header: &[u8]) -> bool {
        header.starts_with(ZIP_MAGIC)
    }

    fn name(&self) -> &str {
        "Office Bleach"
    }

    /// Un ZIP que no es OOXML se copia sin cambios; un paquete reconocido se
    /// reescribe entero o no se escribe nada.
    fn sanitize(
        &self,
        input: &[u8],
        output: &mut dyn Write,
        session: &mut BleachSession,
    ) -> Result<()> {
        let mut package = match Package::open_with_limits(input, &self.limits) {
            Ok(package) => package,
            Err(error) if error.is_structural() => {
                tracing::warn!(%error, "formato no reconocido, se copia la entrada");
                output.write_all(input)?;
                return Ok(());
            }
            Err(error) => return Err(error),
        };

        self.sanitize_package(&mut package, session);

        if package.live_part_count() == 0 {
            return Err(BleachError::EmptyOutput);
        }

        let sanitized = package.save()?;
        if sanitized.is_empty() {
            return Err(BleachError::EmptyOutput);
        }

        output
            .write_all(&sanitized)
            .map_err(|e| BleachError::Serialization(format!("Error escribiendo salida: {}", e)))?;

        tracing::info!(
            threats = session.threat_count(),
            input_size = input.len(),
            output_size = sanitized.len(),
            "documento Office saneado"
        );
        Ok(())
    }
}
