//! Plain-text rendering for terminals.
//!
//! Same content as the HTML output with the detail block always expanded
//! and indented under its card.

use std::fmt::{self, Display, Formatter};

use super::{
    CourseView, InternshipCard, InternshipListing, RatingView, StudyCard, StudyDetails,
    StudyListing,
};

/// Displays a view as plain text.
#[derive(Debug, Clone, Copy)]
pub struct Plain<'a, T>(pub &'a T);

fn line(f: &mut Formatter<'_>, indent: usize, label: &str, value: Option<&String>) -> fmt::Result {
    if let Some(value) = value {
        writeln!(f, "{:indent$}{label}: {value}", "")?;
    }
    Ok(())
}

impl Display for Plain<'_, RatingView> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let rating = self.0;
        if let Some(marker) = rating.marker {
            write!(f, "{marker} ")?;
        }
        f.write_str(&rating.glyphs)?;
        if let Some(label) = rating.label {
            write!(f, " {label}")?;
        }
        Ok(())
    }
}

impl Display for Plain<'_, CourseView> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let course = self.0;
        writeln!(f, "    - {} [{}]", course.title, Plain(&course.difficulty))?;
        line(f, 6, "Responsible", course.responsible_person.as_ref())?;
        line(f, 6, "Email", course.email.as_ref())?;
        line(f, 6, "Exam", course.exam_type.as_ref())?;
        line(f, 6, "ECTS", course.ects.as_ref())?;
        line(f, 6, "Link", course.link.as_ref())?;
        line(f, 6, "Description", course.description.as_ref())
    }
}

impl Display for Plain<'_, StudyDetails> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let details = self.0;
        if let Some(financing) = &details.financing {
            writeln!(f, "  Finances:")?;
            line(f, 4, "Financing", financing.methods.as_ref())?;
            line(f, 4, "Aid amount", financing.aid_amount.as_ref())?;
        }
        if let Some(housing) = &details.housing {
            writeln!(f, "  Housing: {}", housing.housing_type)?;
            writeln!(f, "    Quality: {}", Plain(&housing.quality))?;
            line(f, 4, "Costs", housing.cost.as_ref())?;
            line(f, 4, "Link", housing.link.as_ref())?;
            line(f, 4, "Comments", housing.comments.as_ref())?;
        }
        if let Some(visa) = &details.visa {
            writeln!(f, "  Visa required")?;
            line(f, 4, "Cost", visa.cost.as_ref())?;
            line(f, 4, "Embassy", visa.embassy.as_ref())?;
            line(f, 4, "Embassy location", visa.embassy_location.as_ref())?;
            line(f, 4, "Application time", visa.application_time.as_ref())?;
            line(f, 4, "Website", visa.website.as_ref())?;
            line(f, 4, "Email", visa.email.as_ref())?;
            line(f, 4, "Phone", visa.phone.as_ref())?;
            line(f, 4, "Comments", visa.comments.as_ref())?;
        }
        if !details.vaccinations.is_empty() {
            writeln!(f, "  Vaccinations:")?;
            for vaccination in &details.vaccinations {
                writeln!(f, "    - {}", vaccination.which)?;
                line(f, 6, "Costs", vaccination.cost.as_ref())?;
                line(f, 6, "Comments", vaccination.comments.as_ref())?;
            }
        }
        line(f, 2, "Tips", details.application_tips.as_ref())?;
        line(f, 2, "Comments", details.general_comments.as_ref())
    }
}

impl Display for Plain<'_, StudyCard> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let card = self.0;
        let summary = &card.summary;
        match card.id {
            Some(id) => writeln!(f, "#{id} {}", summary.title)?,
            None => writeln!(f, "{}", summary.title)?,
        }
        write!(f, "  Contact: {} <{}>", summary.contact_name, summary.contact_email)?;
        if let Some(phone) = &summary.contact_phone {
            write!(f, ", {phone}")?;
        }
        writeln!(f)?;
        writeln!(f, "  Study class: {}", summary.class_year)?;
        writeln!(f, "  Duration: {}", summary.duration)?;
        line(f, 2, "Tuition", summary.tuition.as_ref())?;
        line(f, 2, "Website", summary.website.as_ref())?;
        line(f, 2, "Department website", summary.department_website.as_ref())?;
        if !summary.courses.is_empty() {
            writeln!(f, "  Courses:")?;
            for course in &summary.courses {
                write!(f, "{}", Plain(course))?;
            }
        }
        write!(f, "{}", Plain(&card.details))
    }
}

impl Display for Plain<'_, StudyListing> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let listing = self.0;
        if let Some(summary) = &listing.summary {
            writeln!(f, "{summary}")?;
        }
        if let Some(message) = listing.notice {
            return writeln!(f, "{message}");
        }
        for group in &listing.groups {
            writeln!(f)?;
            writeln!(f, "== {} ==", group.country)?;
            for card in &group.cards {
                writeln!(f)?;
                write!(f, "{}", Plain(card))?;
            }
        }
        Ok(())
    }
}

impl Display for Plain<'_, InternshipCard> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let card = self.0;
        match card.id {
            Some(id) => writeln!(f, "#{id} {}", card.title)?,
            None => writeln!(f, "{}", card.title)?,
        }
        writeln!(f, "  Contact: {} <{}>", card.contact_name, card.contact_email)?;
        writeln!(f, "  Duration: {}", card.duration)?;
        if let Some(stipend) = &card.stipend {
            writeln!(f, "  Stipend: €{stipend}/month")?;
        }
        writeln!(f, "  Experience: {}", Plain(&card.experience))?;
        line(f, 2, "Submitted", card.submitted.as_ref())?;
        line(f, 2, "Work", card.work_description.as_ref())?;
        line(f, 2, "Skills learned", card.skills_learned.as_ref())?;
        line(f, 2, "Financing", card.financing_methods.as_ref())?;
        line(f, 2, "Tips", card.application_tips.as_ref())?;
        line(f, 2, "Comments", card.general_comments.as_ref())
    }
}

impl Display for Plain<'_, InternshipListing> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let listing = self.0;
        if let Some(summary) = &listing.summary {
            writeln!(f, "{summary}")?;
        }
        if let Some(message) = listing.notice {
            return writeln!(f, "{message}");
        }
        for card in &listing.cards {
            writeln!(f)?;
            write!(f, "{}", Plain(card))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{QueryOutcome, StudyFilter};
    use crate::render::tests::study;

    #[test]
    fn test_plain_listing() {
        let rows = vec![study(2, "Spain"), study(1, "Spain")];
        let filter = StudyFilter::new("Europe", "", "");
        let text = Plain(&StudyListing::new(&QueryOutcome::Found(rows), &filter)).to_string();
        assert!(text.starts_with("Found 2 entries. Filtered by Continent: Europe."));
        assert_eq!(text.matches("== Spain ==").count(), 1);
        assert!(text.contains("#2 Universidad de Sevilla - Sevilla, Spain"));
        assert!(text.contains("- Econ 101 [🟡 ★★★☆☆ mittel]"));
    }

    #[test]
    fn test_plain_expands_details() {
        let mut row = study(1, "Spain");
        row.housing_type = Some("Dorm".to_string());
        row.housing_quality = Some(2);
        let card = StudyCard::from(&row);
        let text = Plain(&card).to_string();
        assert!(text.contains("Housing: Dorm"));
        assert!(text.contains("Quality: ★★☆☆☆ gerade noch ertragbar"));
    }

    #[test]
    fn test_plain_unavailable() {
        let text = Plain(&InternshipListing::new(&QueryOutcome::Unavailable)).to_string();
        assert_eq!(text, "No data available yet. Please load a database file.\n");
    }
}
