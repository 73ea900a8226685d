//! Portfolio Store: the immutable biographical record served by `/api/portfolio`
//! and rendered into the system prompt.
//!
//! The built-in record ships with the binary. Operators may point `portfolio_path`
//! at a TOML file with the same shape to serve a different person.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub email: String,
    pub linkedin: String,
    pub location: String,
}

/// Skill groups, in the order they are presented.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skills {
    #[serde(default)]
    pub programming: Vec<String>,
    #[serde(default)]
    pub ml_libraries: Vec<String>,
    #[serde(default)]
    pub visualization: Vec<String>,
    #[serde(default)]
    pub ai_ml: Vec<String>,
    #[serde(default)]
    pub cloud: Vec<String>,
    #[serde(default)]
    pub other: Vec<String>,
}

impl Skills {
    /// (label, entries) pairs with human-readable labels.
    pub fn groups(&self) -> [(&'static str, &[String]); 6] {
        [
            ("Programming", &self.programming),
            ("ML Libraries", &self.ml_libraries),
            ("Visualization", &self.visualization),
            ("AI/ML", &self.ai_ml),
            ("Cloud", &self.cloud),
            ("Other", &self.other),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub achievement: String,
    pub impact: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Education {
    pub degree: String,
    pub major: String,
    pub institution: String,
    pub duration: String,
}

/// A sample exchange shown to the model to set tone and scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleResponse {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioRecord {
    pub name: String,
    pub role: String,
    pub tagline: String,
    pub location: String,
    pub contact: Contact,
    pub about: String,
    pub skills: Skills,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub projects: Vec<Project>,
    pub education: Education,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub publications: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub example_responses: Vec<ExampleResponse>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl PortfolioRecord {
    /// The dataset shipped with the service.
    pub fn builtin() -> Self {
        Self {
            name: "Lathasri Ravirala".into(),
            role: "AI & Data Science Student | ML Research Intern".into(),
            tagline: "Exploring ML Models with Math | Emerging Tech Enthusiast | AI Engineering".into(),
            location: "Hyderabad, Telangana, India".into(),
            contact: Contact {
                email: "lathasriravirala2003@gmail.com".into(),
                linkedin: "https://www.linkedin.com/in/lathasri-ravirala-06b606309".into(),
                location: "Hyderabad, Telangana, India".into(),
            },
            about: "I'm an AI & Data Science student, driven by a passion for building intelligent systems that make a tangible impact. I'm excited to build AI agents that not only solve problems but also communicate and evolve intelligently.".into(),
            skills: Skills {
                programming: strings(&["Python", "SQL"]),
                ml_libraries: strings(&[
                    "scikit-learn",
                    "NumPy",
                    "Pandas",
                    "Matplotlib",
                    "TensorFlow",
                ]),
                visualization: strings(&["Power BI", "Tableau"]),
                ai_ml: strings(&[
                    "Machine Learning Algorithms",
                    "Deep Learning",
                    "CNN",
                    "RAG",
                    "Explainable AI (SHAP, LIME)",
                ]),
                cloud: strings(&["Azure AI"]),
                other: strings(&["Research Skills", "Data Visualization", "Model Optimization"]),
            },
            experience: vec![
                Experience {
                    title: "Summer Research Intern".into(),
                    company: "Symbiosis Institute of Technology, Hyderabad".into(),
                    duration: "May 2025 - July 2025 (3 months)".into(),
                    location: Some("Hyderabad, Telangana, India".into()),
                    description: strings(&[
                        "Conducted comparative study of Logistic Regression, Random Forest, and XGBoost for early disease prediction",
                        "Achieved superior results with ensemble methods through hyperparameter tuning and feature engineering",
                        "Applied explainable AI techniques (SHAP & LIME) to enhance model interpretability for clinical adoption",
                        "Developed skills in machine learning, data analysis, and model evaluation",
                    ]),
                },
                Experience {
                    title: "AI Azure Virtual Intern".into(),
                    company: "All India Council for Technical Education (AICTE)".into(),
                    duration: "June 2025 - July 2025 (2 months)".into(),
                    location: None,
                    description: strings(&[
                        "Completed virtual internship focused on AI on Azure",
                        "Implemented and deployed AI/Machine Learning models within Azure environment",
                        "Gained practical knowledge of Azure AI tools for model training, deployment, and monitoring",
                    ]),
                },
                Experience {
                    title: "AI Forensic Advisory Virtual Intern (Star Performer)".into(),
                    company: "Grant Thornton China".into(),
                    duration: "May 2025 - June 2025 (2 months)".into(),
                    location: None,
                    description: strings(&[
                        "Completed 4-week virtual internship enhancing forensic advisory services through AI/ML",
                        "Conducted comprehensive market research on AI/ML trends in forensic advisory",
                        "Developed AI-driven frameworks for advanced fraud detection",
                        "Recognized as Star Performer for exceptional performance and strategic insights",
                    ]),
                },
            ],
            projects: vec![
                Project {
                    name: "CNN Chest X-Ray Classifier".into(),
                    description: "Designed a convolutional neural network to detect pneumonia and tuberculosis from chest X-rays".into(),
                    technologies: strings(&["Python", "TensorFlow", "CNN", "Medical AI"]),
                    achievement: "Achieved 85% accuracy".into(),
                    impact: "Enhanced skills in medical AI and image classification".into(),
                },
                Project {
                    name: "Math-Routing Agent".into(),
                    description: "Developed an AI agent using Retrieval-Augmented Generation (RAG) and Model Context Protocol (MCP)".into(),
                    technologies: strings(&["Python", "RAG", "MCP", "Hugging Face APIs"]),
                    achievement: "Successfully integrated agentic AI with tool integration".into(),
                    impact: "Refined abilities in building intelligent AI agents".into(),
                },
                Project {
                    name: "Retail Trends Visualization (Published Paper)".into(),
                    description: "Visualizing Retail Trends and Performance Using Tableau: A Study of the SuperStoreOrders Dataset".into(),
                    technologies: strings(&["Tableau", "Data Visualization", "Data Analytics"]),
                    achievement: "Published research paper".into(),
                    impact: "Showcased flair for data storytelling and visualization".into(),
                },
            ],
            education: Education {
                degree: "Bachelor of Engineering - BE".into(),
                major: "Artificial Intelligence and Data Science".into(),
                institution: "Methodist College of Engineering & Technology".into(),
                duration: "November 2022 - July 2026".into(),
            },
            certifications: strings(&[
                "The Joy of Computing Using Python",
                "Data Analytics",
                "Data Visualization",
                "Power BI",
                "CCNAv7: Introduction to Networks",
            ]),
            publications: strings(&[
                "Visualizing Retail Trends and Performance Using Tableau: A Study of the SuperStoreOrders Dataset",
            ]),
            example_responses: vec![
                ExampleResponse {
                    question: "What are your skills?".into(),
                    answer: "I'm proficient in Python and SQL for programming. For machine learning, I work with scikit-learn, TensorFlow, NumPy, Pandas, and Matplotlib. I also have strong skills in data visualization using Power BI and Tableau. My AI/ML expertise includes deep learning, CNNs, RAG, and explainable AI techniques like SHAP and LIME. Recently, I've also gained experience with Azure AI for cloud-based ML deployments.".into(),
                },
                ExampleResponse {
                    question: "Tell me about your projects".into(),
                    answer: "I've worked on several exciting projects! My CNN Chest X-Ray Classifier achieved 85% accuracy in detecting pneumonia and tuberculosis from medical images. I also built a Math-Routing Agent using RAG and the Model Context Protocol, which helped me dive deep into agentic AI. Additionally, I published a research paper on visualizing retail trends using Tableau. Each project has strengthened my skills in different areas of AI and data science.".into(),
                },
                ExampleResponse {
                    question: "What's the weather like?".into(),
                    answer: "I'm here to answer questions about Lathasri's portfolio, skills, and experience in AI and data science. Is there anything about her projects, skills, or background you'd like to know?".into(),
                },
            ],
        }
    }

    /// Load a record from a TOML file with the same field layout as the JSON output.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let record: PortfolioRecord = toml::from_str(&content)?;
        Ok(record)
    }
}

/// Read-only handle shared by every request.
#[derive(Debug, Clone)]
pub struct PortfolioStore {
    record: Arc<PortfolioRecord>,
}

impl PortfolioStore {
    pub fn new(record: PortfolioRecord) -> Self {
        Self {
            record: Arc::new(record),
        }
    }

    /// Built-in record unless `path` is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let record = match path {
            Some(p) => {
                tracing::info!(path = %p.display(), "loading portfolio override");
                PortfolioRecord::from_toml_file(p)?
            }
            None => PortfolioRecord::builtin(),
        };
        Ok(Self::new(record))
    }

    pub fn get(&self) -> &PortfolioRecord {
        &self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn json_keeps_published_field_names() {
        let value = serde_json::to_value(PortfolioRecord::builtin()).unwrap();
        assert_eq!(value["name"], "Lathasri Ravirala");
        assert_eq!(value["contact"]["email"], "lathasriravirala2003@gmail.com");
        assert_eq!(value["skills"]["ml_libraries"][0], "scikit-learn");
        assert_eq!(value["experience"].as_array().unwrap().len(), 3);
        assert_eq!(value["projects"][0]["achievement"], "Achieved 85% accuracy");
        assert_eq!(value["education"]["duration"], "November 2022 - July 2026");
        assert_eq!(value["certifications"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn absent_experience_location_is_omitted() {
        let value = serde_json::to_value(PortfolioRecord::builtin()).unwrap();
        assert!(value["experience"][0].get("location").is_some());
        assert!(value["experience"][1].get("location").is_none());
    }

    #[test]
    fn store_returns_record_unmodified() {
        let store = PortfolioStore::load(None).unwrap();
        assert_eq!(store.get(), &PortfolioRecord::builtin());
        let clone = store.clone();
        assert!(std::ptr::eq(store.get(), clone.get()));
    }

    #[test]
    fn toml_override_round_trips() {
        let mut record = PortfolioRecord::builtin();
        record.name = "Ada Example".into();
        record.publications.clear();
        let text = toml::to_string(&record).unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();

        let store = PortfolioStore::load(Some(file.path())).unwrap();
        assert_eq!(store.get().name, "Ada Example");
        assert!(store.get().publications.is_empty());
    }

    #[test]
    fn override_without_examples_loads_empty_list() {
        let mut record = PortfolioRecord::builtin();
        record.example_responses.clear();
        let text = toml::to_string(&record).unwrap();
        assert!(!text.contains("example_responses"));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        let store = PortfolioStore::load(Some(file.path())).unwrap();
        assert!(store.get().example_responses.is_empty());
    }

    #[test]
    fn missing_override_file_is_an_error() {
        let err = PortfolioStore::load(Some(Path::new("/nonexistent/portfolio.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
