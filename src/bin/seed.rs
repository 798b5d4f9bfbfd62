//! Populates the database with a skill catalogue and sample candidates.
//!
//! Safe to re-run: skills are upserted and candidates whose email is already
//! taken are skipped.

use candidate_tracker::{
    config::Config,
    database::pool::{create_pool, run_migrations},
    dto::candidate_dto::NewCandidate,
    logging::init_tracing,
    models::candidate::CandidateStatus,
    services::candidate_service::{CandidateService, WriteOutcome},
};
use tracing::{info, warn};

const SKILLS: [&str; 15] = [
    "React",
    "TypeScript",
    "Node.js",
    "Python",
    "JavaScript",
    "Docker",
    "Kubernetes",
    "AWS",
    "PostgreSQL",
    "MongoDB",
    "Express",
    "GraphQL",
    "REST API",
    "CI/CD",
    "Git",
];

struct Sample {
    name: &'static str,
    position: &'static str,
    status: CandidateStatus,
    email: &'static str,
    phone: &'static str,
    description: &'static str,
    skills: &'static [&'static str],
}

const CANDIDATES: &[Sample] = &[
    Sample {
        name: "Alex Johnson",
        position: "Senior Full Stack Developer",
        status: CandidateStatus::Active,
        email: "alex.johnson@example.com",
        phone: "+1-555-0101",
        description: "Experienced developer with 5+ years in React and Node.js, passionate about building scalable applications",
        skills: &["React", "TypeScript", "Node.js", "PostgreSQL", "AWS"],
    },
    Sample {
        name: "Maria Garcia",
        position: "Frontend Developer",
        status: CandidateStatus::Interview,
        email: "maria.garcia@example.com",
        phone: "+1-555-0102",
        description: "Specializes in creating modern UIs with React and TypeScript, strong focus on user experience",
        skills: &["React", "TypeScript", "JavaScript", "REST API"],
    },
    Sample {
        name: "David Chen",
        position: "Backend Developer",
        status: CandidateStatus::Active,
        email: "david.chen@example.com",
        phone: "+1-555-0103",
        description: "Expert in Node.js, Python and microservices architecture, experienced in high-load systems",
        skills: &["Node.js", "Python", "Docker", "Kubernetes", "MongoDB"],
    },
    Sample {
        name: "Sarah Williams",
        position: "DevOps Engineer",
        status: CandidateStatus::Rejected,
        email: "sarah.williams@example.com",
        phone: "+1-555-0104",
        description: "Experience in CI/CD pipelines and cloud infrastructure management",
        skills: &["Docker", "Kubernetes", "AWS", "CI/CD", "Git"],
    },
    Sample {
        name: "Michael Brown",
        position: "Full Stack Developer",
        status: CandidateStatus::Active,
        email: "michael.brown@example.com",
        phone: "+1-555-0105",
        description: "Versatile developer with experience from frontend to DevOps, strong problem-solving skills",
        skills: &["React", "Node.js", "Express", "PostgreSQL", "Docker"],
    },
    Sample {
        name: "Emily Davis",
        position: "React Developer",
        status: CandidateStatus::Interview,
        email: "emily.davis@example.com",
        phone: "+1-555-0106",
        description: "Focus on building scalable React applications with modern best practices",
        skills: &["React", "TypeScript", "GraphQL", "REST API", "Git"],
    },
    Sample {
        name: "James Wilson",
        position: "Python Backend Developer",
        status: CandidateStatus::Active,
        email: "james.wilson@example.com",
        phone: "+1-555-0107",
        description: "Developing high-load backend systems with Python, experienced in distributed systems",
        skills: &["Python", "PostgreSQL", "MongoDB", "Docker", "REST API"],
    },
    Sample {
        name: "Lisa Anderson",
        position: "Junior Full Stack Developer",
        status: CandidateStatus::Rejected,
        email: "lisa.anderson@example.com",
        phone: "+1-555-0108",
        description: "Junior developer with foundational skills in full stack development, eager to learn",
        skills: &["JavaScript", "React", "Node.js", "Git"],
    },
    Sample {
        name: "Robert Taylor",
        position: "Cloud Architect",
        status: CandidateStatus::Interview,
        email: "robert.taylor@example.com",
        phone: "+1-555-0109",
        description: "Specialized in cloud infrastructure design and implementation on AWS",
        skills: &["AWS", "Kubernetes", "Docker", "Python", "CI/CD"],
    },
    Sample {
        name: "Jennifer Martinez",
        position: "Frontend Engineer",
        status: CandidateStatus::Active,
        email: "jennifer.martinez@example.com",
        phone: "+1-555-0110",
        description: "Expert in modern frontend frameworks with strong TypeScript skills",
        skills: &["React", "TypeScript", "JavaScript", "GraphQL", "Git"],
    },
];

impl Sample {
    fn to_new_candidate(&self) -> NewCandidate {
        NewCandidate {
            name: self.name.to_string(),
            position: self.position.to_string(),
            status: self.status,
            email: self.email.to_string(),
            phone: self.phone.to_string(),
            description: self.description.to_string(),
            skills: self.skills.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    let pool = create_pool(&config).await?;
    run_migrations(&pool).await?;
    let service = CandidateService::new(pool.clone());

    let catalogue: Vec<String> = SKILLS.iter().map(|s| s.to_string()).collect();
    let skills = service.ensure_skills(&catalogue).await?;
    info!(count = skills.len(), "Skill catalogue ready");

    let mut created = 0;
    for sample in CANDIDATES {
        match service.create_candidate(sample.to_new_candidate()).await? {
            WriteOutcome::Applied(candidate) => {
                created += 1;
                info!(id = candidate.id, name = %candidate.name, "Created candidate");
            }
            WriteOutcome::EmailTaken => {
                warn!(email = sample.email, "Candidate already exists, skipping");
            }
            WriteOutcome::NotFound => {
                warn!(email = sample.email, "Unexpected not-found while seeding");
            }
        }
    }

    info!(created, total = CANDIDATES.len(), "Seeding finished");
    pool.close().await;
    Ok(())
}
