use crate::profile::Profile;
use std::fmt::Write;

/// Builds the fixed system instruction: behavioural rules followed by the
/// knowledge base the assistant may answer from.
pub fn build_system_prompt(profile: &Profile) -> String {
    let name = &profile.name;
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(
        out,
        "You are a friendly AI assistant on {name}'s personal portfolio website. \
         Answer visitors' questions about {name}'s background, skills, projects and \
         experience using only the information below."
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Rules:");
    let _ = writeln!(out, "- Keep answers concise, warm and professional.");
    let _ = writeln!(out, "- Refer to {name} in the third person.");
    let _ = writeln!(
        out,
        "- If the answer is not in the information below, say you don't know and suggest \
         using the Contact section or emailing {}.",
        profile.email
    );
    let _ = writeln!(
        out,
        "- Politely decline questions unrelated to {name} or the portfolio."
    );

    let _ = writeln!(out);
    let _ = writeln!(out, "## About {name}");
    let _ = writeln!(out, "{}", profile.headline);
    if let Some(location) = &profile.location {
        let _ = writeln!(out, "Location: {location}");
    }
    let _ = writeln!(out, "{}", profile.summary);
    let _ = writeln!(out, "Email: {}", profile.email);

    if !profile.skills.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Skills");
        for group in &profile.skills {
            let _ = writeln!(out, "- {}: {}", group.category, group.items.join(", "));
        }
    }

    if !profile.projects.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Projects");
        for project in &profile.projects {
            let _ = write!(out, "- {}: {}", project.name, project.description);
            if !project.technologies.is_empty() {
                let _ = write!(out, " (Tech: {})", project.technologies.join(", "));
            }
            let _ = writeln!(out);
        }
    }

    if !profile.experience.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Experience");
        for job in &profile.experience {
            let _ = writeln!(out, "- {} at {} ({})", job.role, job.organization, job.period);
            for highlight in &job.highlights {
                let _ = writeln!(out, "  - {highlight}");
            }
        }
    }

    if !profile.education.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Education");
        for entry in &profile.education {
            let _ = writeln!(
                out,
                "- {}, {} ({})",
                entry.degree, entry.institution, entry.period
            );
        }
    }

    out
}
