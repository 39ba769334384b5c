use std::collections::HashMap;

use actix_web::{get, http::header, post, web, HttpResponse};
use askama::Template;
use sqlx::PgPool;

use crate::{
    dal::{entry_sheet_db, question_db},
    domain::{
        answer_form::{parse_answer_forms, validate_answer_forms},
        entry_sheet::{EntrySheet, EntrySheetAccess, Question},
        news::NewsItem,
    },
    services::{NewsClient, WordcloudResolver},
};

use super::CurrentUser;

const MISSING_MESSAGE: &str = "The specified entry sheet does not exist.";
const FOREIGN_MESSAGE: &str = "This entry sheet belongs to another user.";

#[derive(Template)]
#[template(path = "es_edit.html")]
struct EsEditTemplate {
    message: String,
    es_info: Option<EntrySheet>,
    posts: Vec<PostForm>,
    errors: Vec<String>,
    news_list: Vec<NewsItem>,
    company_info: Option<CompanyInfo>,
    total_forms: usize,
}

impl EsEditTemplate {
    fn message_only(message: &str) -> Self {
        EsEditTemplate {
            message: message.to_string(),
            es_info: None,
            posts: vec![],
            errors: vec![],
            news_list: vec![],
            company_info: None,
            total_forms: 0,
        }
    }
}

struct PostForm {
    index: usize,
    question: Question,
    answer: String,
    related_posts: Vec<Question>,
}

struct CompanyInfo {
    wordcloud_path: String,
}

fn render_page(template: EsEditTemplate) -> HttpResponse {
    match template.render() {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(e) => {
            log::error!("Error rendering entry sheet page: {:?}", e);
            HttpResponse::InternalServerError().body("Could not render page")
        }
    }
}

fn database_error(es_id: i64, e: sqlx::Error) -> HttpResponse {
    log::error!("Database error on entry sheet {}: {:?}", es_id, e);
    HttpResponse::InternalServerError().body("Could not load entry sheet")
}

/// Pairs each question with the answer to show and the user's related posts.
async fn build_post_forms(
    pool: &PgPool,
    questions: Vec<Question>,
    author_id: i64,
    submitted: &HashMap<i64, String>,
) -> Result<Vec<PostForm>, sqlx::Error> {
    let mut posts = Vec::with_capacity(questions.len());

    for (index, question) in questions.into_iter().enumerate() {
        let related_posts =
            question_db::get_related_questions(pool, question.id, author_id).await?;
        let answer = submitted
            .get(&question.id)
            .cloned()
            .unwrap_or_else(|| question.answer.clone());

        posts.push(PostForm {
            index,
            question,
            answer,
            related_posts,
        });
    }

    Ok(posts)
}

async fn load_access(
    pool: &PgPool,
    es_id: i64,
    user: CurrentUser,
) -> Result<EntrySheetAccess, sqlx::Error> {
    let entry_sheet = entry_sheet_db::get_entry_sheet(pool, es_id).await?;
    Ok(EntrySheetAccess::check(entry_sheet, user.id))
}

#[get("/{es_id:\\d+}")]
async fn es_edit_page(
    path: web::Path<i64>,
    user: CurrentUser,
    pool: web::Data<PgPool>,
    news_client: web::Data<NewsClient>,
) -> HttpResponse {
    let es_id = path.into_inner();

    let es_info = match load_access(&pool, es_id, user).await {
        Ok(EntrySheetAccess::Owned(es)) => es,
        Ok(EntrySheetAccess::Missing) => {
            return render_page(EsEditTemplate::message_only(MISSING_MESSAGE))
        }
        Ok(EntrySheetAccess::Foreign) => {
            return render_page(EsEditTemplate::message_only(FOREIGN_MESSAGE))
        }
        Err(e) => return database_error(es_id, e),
    };

    let posts = match question_db::get_questions_for_entry_sheet(&pool, es_id).await {
        Ok(questions) => build_post_forms(&pool, questions, user.id, &HashMap::new()).await,
        Err(e) => Err(e),
    };
    let posts = match posts {
        Ok(posts) => posts,
        Err(e) => return database_error(es_id, e),
    };

    let news_list = news_client.get_news(&es_info.company).await;

    // The page asks for the word cloud once it has loaded
    render_page(EsEditTemplate {
        message: "OK".to_string(),
        total_forms: posts.len(),
        es_info: Some(es_info),
        posts,
        errors: vec![],
        news_list,
        company_info: None,
    })
}

#[post("/{es_id:\\d+}")]
async fn save_answers(
    path: web::Path<i64>,
    user: CurrentUser,
    form: web::Form<HashMap<String, String>>,
    pool: web::Data<PgPool>,
    news_client: web::Data<NewsClient>,
    resolver: web::Data<WordcloudResolver>,
) -> HttpResponse {
    let es_id = path.into_inner();

    let es_info = match load_access(&pool, es_id, user).await {
        Ok(EntrySheetAccess::Owned(es)) => es,
        Ok(EntrySheetAccess::Missing) => {
            return render_page(EsEditTemplate::message_only(MISSING_MESSAGE))
        }
        Ok(EntrySheetAccess::Foreign) => {
            return render_page(EsEditTemplate::message_only(FOREIGN_MESSAGE))
        }
        Err(e) => return database_error(es_id, e),
    };

    let questions = match question_db::get_questions_for_entry_sheet(&pool, es_id).await {
        Ok(questions) => questions,
        Err(e) => return database_error(es_id, e),
    };

    let (submitted, errors) = match parse_answer_forms(&form) {
        Ok(submitted) => match validate_answer_forms(&submitted, &questions) {
            Ok(answers) => {
                if let Err(e) = question_db::update_answers(&pool, es_id, &answers).await {
                    return database_error(es_id, e);
                }
                log::info!("Saved {} answers on entry sheet {}", answers.len(), es_id);
                return HttpResponse::SeeOther()
                    .insert_header((header::LOCATION, "/"))
                    .finish();
            }
            Err(errors) => (submitted, errors),
        },
        Err(e) => (vec![], vec![e]),
    };

    let submitted: HashMap<i64, String> = submitted
        .into_iter()
        .filter_map(|s| s.question_id.map(|id| (id, s.answer)))
        .collect();
    let posts = match build_post_forms(&pool, questions, user.id, &submitted).await {
        Ok(posts) => posts,
        Err(e) => return database_error(es_id, e),
    };

    let news_list = news_client.get_news(&es_info.company).await;
    let wordcloud_path = resolver
        .resolve(&es_info.company, &es_info.homepage_url)
        .await;

    render_page(EsEditTemplate {
        message: "OK".to_string(),
        total_forms: posts.len(),
        es_info: Some(es_info),
        posts,
        errors: errors.iter().map(|e| e.to_string()).collect(),
        news_list,
        company_info: Some(CompanyInfo { wordcloud_path }),
    })
}
