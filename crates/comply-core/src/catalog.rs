//! Framework catalog definitions.
//!
//! `FrameworkDefinition` is the input to catalog seeding. `builtin()` returns
//! the frameworks shipped with the product.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::FrameworkType;

/// Seed data for one framework. Seeding is keyed by `framework_type`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FrameworkDefinition {
    pub framework_type: FrameworkType,
    pub name: String,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub categories: Vec<String>,
}

impl FrameworkDefinition {
    fn new(
        framework_type: FrameworkType,
        name: &str,
        description: &str,
        requirements: &str,
        categories: &[&str],
    ) -> Self {
        Self {
            framework_type,
            name: name.to_string(),
            description: Some(description.to_string()),
            requirements: Some(requirements.to_string()),
            categories: categories.iter().map(|c| (*c).to_string()).collect(),
        }
    }

    /// The built-in catalog, one definition per `FrameworkType`.
    #[must_use]
    pub fn builtin() -> Vec<Self> {
        vec![
            Self::new(
                FrameworkType::PciDss,
                "Payment Card Industry Data Security Standard",
                "Security standard for organizations that store, process, or transmit cardholder data.",
                "Build and maintain a secure network; protect cardholder data; maintain a vulnerability \
                 management program; implement strong access control; monitor and test networks; \
                 maintain an information security policy.",
                &[
                    "Network Security",
                    "Data Protection",
                    "Vulnerability Management",
                    "Access Control",
                    "Monitoring",
                    "Security Policy",
                ],
            ),
            Self::new(
                FrameworkType::Soc2,
                "SOC 2",
                "Service Organization Control 2 report on controls relevant to security, availability, \
                 processing integrity, confidentiality, and privacy.",
                "Trust Services Criteria: security, availability, processing integrity, \
                 confidentiality, privacy.",
                &[
                    "Security",
                    "Availability",
                    "Processing Integrity",
                    "Confidentiality",
                    "Privacy",
                ],
            ),
            Self::new(
                FrameworkType::Gdpr,
                "General Data Protection Regulation",
                "EU regulation on the protection of natural persons with regard to the processing of \
                 personal data.",
                "Lawful basis for processing; data subject rights; records of processing; data \
                 protection impact assessments; breach notification within 72 hours.",
                &[
                    "Lawfulness",
                    "Data Subject Rights",
                    "Accountability",
                    "Security of Processing",
                    "Breach Notification",
                ],
            ),
            Self::new(
                FrameworkType::Iso27001,
                "ISO/IEC 27001",
                "International standard for establishing, implementing, maintaining, and continually \
                 improving an information security management system.",
                "ISMS scope and context; leadership; risk assessment and treatment; Annex A controls; \
                 internal audit; management review.",
                &[
                    "Context",
                    "Leadership",
                    "Planning",
                    "Support",
                    "Operation",
                    "Performance Evaluation",
                    "Improvement",
                ],
            ),
            Self::new(
                FrameworkType::Hipaa,
                "Health Insurance Portability and Accountability Act",
                "US law protecting the privacy and security of protected health information.",
                "Privacy Rule; Security Rule administrative, physical, and technical safeguards; \
                 Breach Notification Rule.",
                &[
                    "Administrative Safeguards",
                    "Physical Safeguards",
                    "Technical Safeguards",
                    "Breach Notification",
                ],
            ),
        ]
    }
}
