// Demo dataset for the in-memory repositories: the reference countries and
// schools plus a small curriculum tree with questions linked to subtopics.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::info;

use crate::core::{RecordId, Timestamp};
use crate::error::AppResult;
use crate::listing::{ListSpec, Lookup};
use crate::models::{
    Country, Course, Question, QuestionOption, QuestionType, School, Subject, Subtopic, SubtopicRef, Topic,
};
use crate::repository::{InMemoryLinks, InMemoryRepository, LinkRepository};

fn id(raw: &str) -> RecordId {
    RecordId::new(raw)
}

fn date(raw: &str) -> Option<Timestamp> {
    Timestamp::parse(raw)
}

pub fn countries() -> Vec<Country> {
    [
        ("1", "United States", "2025-01-15"),
        ("2", "Canada", "2025-01-16"),
        ("3", "United Kingdom", "2025-01-17"),
        ("4", "Australia", "2025-01-18"),
        ("5", "Germany", "2025-01-19"),
    ]
    .into_iter()
    .map(|(key, name, created)| Country {
        id: id(key),
        name: name.to_string(),
        created_at: date(created),
    })
    .collect()
}

pub fn schools() -> Vec<School> {
    [
        ("1", "Harvard University", "1", "Cambridge", "Massachusetts Hall, Cambridge, MA 02138", "2025-01-10"),
        ("2", "University of Toronto", "2", "Toronto", "27 King's College Cir, Toronto, ON M5S, Canada", "2025-02-15"),
        ("3", "Oxford University", "3", "Oxford", "University Offices, Wellington Square, Oxford OX1 2JD, UK", "2025-03-01"),
        ("4", "University of Melbourne", "4", "Melbourne", "Grattan St, Parkville VIC 3010, Australia", "2025-01-20"),
        ("5", "Technical University of Munich", "5", "Munich", "Arcisstraße 21, 80333 München, Germany", "2025-02-20"),
    ]
    .into_iter()
    .map(|(key, name, country, city, address, created)| School {
        id: id(key),
        name: name.to_string(),
        country_id: id(country),
        city: city.to_string(),
        address: address.to_string(),
        created_at: date(created),
    })
    .collect()
}

pub fn subjects() -> Vec<Subject> {
    [
        ("1", "Mathematics", "Numbers, structure and change", "2025-01-05"),
        ("2", "Science", "Physics, chemistry and biology", "2025-01-06"),
        ("3", "Geography", "Places, people and environments", "2025-01-07"),
    ]
    .into_iter()
    .map(|(key, name, description, created)| Subject {
        id: id(key),
        name: name.to_string(),
        description: description.to_string(),
        created_at: date(created),
    })
    .collect()
}

pub fn courses() -> Vec<Course> {
    [
        ("1", "Algebra I", "Linear equations and inequalities", "1", "2025-01-08"),
        ("2", "Geometry", "Shapes, angles and proofs", "1", "2025-01-09"),
        ("3", "Physics Fundamentals", "Motion, forces and energy", "2", "2025-01-10"),
        ("4", "World Geography", "Countries and capitals", "3", "2025-01-11"),
    ]
    .into_iter()
    .map(|(key, name, description, subject, created)| Course {
        id: id(key),
        name: name.to_string(),
        description: description.to_string(),
        subject_id: id(subject),
        created_at: date(created),
    })
    .collect()
}

pub fn topics() -> Vec<Topic> {
    [
        ("1", "Linear Equations", "Solving for one unknown", "1", "2025-01-12"),
        ("2", "Triangles", "Congruence and similarity", "2", "2025-01-13"),
        ("3", "Thermodynamics", "Heat and temperature", "3", "2025-01-14"),
        ("4", "North America", "Countries of North America", "4", "2025-01-15"),
    ]
    .into_iter()
    .map(|(key, name, description, course, created)| Topic {
        id: id(key),
        name: name.to_string(),
        description: description.to_string(),
        course_id: id(course),
        created_at: date(created),
    })
    .collect()
}

pub fn subtopics() -> Vec<Subtopic> {
    [
        ("1", "One-step equations", "1", 1, "2025-01-16"),
        ("2", "Two-step equations", "1", 2, "2025-01-17"),
        ("3", "Boiling and freezing", "3", 1, "2025-01-18"),
        ("4", "Heat transfer", "3", 2, "2025-01-19"),
        ("5", "Capitals", "4", 1, "2025-01-20"),
    ]
    .into_iter()
    .map(|(key, name, topic, order, created)| Subtopic {
        id: id(key),
        name: name.to_string(),
        description: String::new(),
        topic_id: id(topic),
        order,
        created_at: date(created),
    })
    .collect()
}

pub fn questions() -> Vec<Question> {
    vec![
        Question {
            id: id("q1"),
            title: "Capital of Canada".to_string(),
            description: String::new(),
            content: "What is the capital of Canada?".to_string(),
            question_type: QuestionType::MultipleChoice,
            is_true: None,
            total_potential_marks: 1.0,
            difficulty_level: 0.2,
            tags: vec!["capitals".to_string()],
            sub_topics: vec![SubtopicRef {
                id: id("5"),
                name: "Capitals".to_string(),
                description: String::new(),
            }],
            multiple_choice_options: vec![
                QuestionOption::new("1", "Ottawa", true),
                QuestionOption::new("2", "Toronto", false),
                QuestionOption::new("3", "Montreal", false),
                QuestionOption::new("4", "Vancouver", false),
            ],
            created_at: date("2025-01-21"),
        },
        Question {
            id: id("q2"),
            title: "Boiling point".to_string(),
            description: String::new(),
            content: "Water boils at 100C at sea level.".to_string(),
            question_type: QuestionType::TrueFalse,
            is_true: Some(true),
            total_potential_marks: 1.0,
            difficulty_level: 0.1,
            tags: vec!["heat".to_string()],
            sub_topics: vec![SubtopicRef {
                id: id("3"),
                name: "Boiling and freezing".to_string(),
                description: String::new(),
            }],
            multiple_choice_options: Vec::new(),
            created_at: date("2025-01-22"),
        },
    ]
}

/// The in-memory store behind a demo console.
pub struct DemoStore {
    pub countries: Arc<InMemoryRepository<Country>>,
    pub schools: Arc<InMemoryRepository<School>>,
    pub subjects: Arc<InMemoryRepository<Subject>>,
    pub courses: Arc<InMemoryRepository<Course>>,
    pub topics: Arc<InMemoryRepository<Topic>>,
    pub subtopics: Arc<InMemoryRepository<Subtopic>>,
    pub questions: Arc<InMemoryRepository<Question>>,
    pub subtopic_questions: Arc<InMemoryLinks>,
    pub subject_courses: Arc<InMemoryLinks>,
}

fn names<'a, I>(pairs: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (&'a RecordId, &'a str)>,
{
    pairs
        .into_iter()
        .map(|(key, name)| (key.as_str().to_string(), name.to_string()))
        .collect()
}

/// Seed every repository; lookup columns resolve against the seeded parents.
pub async fn seed_demo_store(page_size: usize) -> AppResult<DemoStore> {
    let countries = countries();
    let subjects = subjects();
    let courses = courses();
    let topics = topics();
    let subtopics = subtopics();
    let questions = questions();

    let country_names = Lookup::with_names("country", names(countries.iter().map(|c| (&c.id, c.name.as_str()))));
    let subject_names = Lookup::with_names("subject", names(subjects.iter().map(|s| (&s.id, s.name.as_str()))));
    let course_names = Lookup::with_names("course", names(courses.iter().map(|c| (&c.id, c.name.as_str()))));
    let topic_names = Lookup::with_names("topic", names(topics.iter().map(|t| (&t.id, t.name.as_str()))));

    let spec = ListSpec::with_page_size(page_size);
    let subtopic_questions = Arc::new(InMemoryLinks::new());
    let subject_courses = Arc::new(InMemoryLinks::new());

    let question_links = questions
        .iter()
        .flat_map(|q| q.sub_topics.iter().map(move |s| (s.id.clone(), q.id.clone())))
        .collect::<Vec<_>>();
    try_join_all(
        question_links
            .iter()
            .map(|(subtopic, question)| subtopic_questions.link(subtopic, question)),
    )
    .await?;
    try_join_all(
        courses
            .iter()
            .map(|course| subject_courses.link(&course.subject_id, &course.id)),
    )
    .await?;

    info!(
        "Seeded demo store: {} countries, {} subjects, {} courses, {} questions",
        countries.len(),
        subjects.len(),
        courses.len(),
        questions.len()
    );

    Ok(DemoStore {
        countries: Arc::new(InMemoryRepository::new(countries).with_spec(spec.clone())),
        schools: Arc::new(
            InMemoryRepository::new(schools()).with_spec(spec.clone().lookup("country", country_names)),
        ),
        subjects: Arc::new(InMemoryRepository::new(subjects).with_spec(spec.clone())),
        courses: Arc::new(
            InMemoryRepository::new(courses).with_spec(spec.clone().lookup("subject", subject_names)),
        ),
        topics: Arc::new(InMemoryRepository::new(topics).with_spec(spec.clone().lookup("course", course_names))),
        subtopics: Arc::new(
            InMemoryRepository::new(subtopics).with_spec(spec.clone().lookup("topic", topic_names)),
        ),
        questions: Arc::new(InMemoryRepository::new(questions).with_spec(spec)),
        subtopic_questions,
        subject_courses,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_countries() {
        let countries = countries();
        let names: Vec<&str> = countries.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["United States", "Canada", "United Kingdom", "Australia", "Germany"]
        );
        assert_eq!(countries[0].created_at, Timestamp::parse("2025-01-15"));
    }

    #[test]
    fn test_every_school_points_at_a_country() {
        let countries = countries();
        assert!(schools()
            .iter()
            .all(|s| countries.iter().any(|c| c.id == s.country_id)));
    }

    #[tokio::test]
    async fn test_seeded_links() {
        let store = seed_demo_store(10).await.unwrap();
        assert!(store.subtopic_questions.contains(&id("3"), &id("q2")).await);
        assert_eq!(store.subject_courses.children_of(&id("1")).await.len(), 2);
        assert_eq!(store.countries.len().await, 5);
    }
}
