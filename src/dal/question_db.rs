use sqlx::PgPool;

use crate::domain::{
    answer_form::AnswerForm,
    entry_sheet::{count_chars, Question},
};

pub async fn get_questions_for_entry_sheet(
    pool: &PgPool,
    entry_sheet_id: i64,
) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(
        r"
        select
            id,
            entry_sheet_id,
            question,
            answer,
            char_num
        from
            question
        where
            entry_sheet_id = $1
        order by id
        ",
    )
    .bind(entry_sheet_id)
    .fetch_all(pool)
    .await
}

/// The question `id`, only when its entry sheet belongs to `author_id`.
pub async fn get_question_for_author(
    pool: &PgPool,
    id: i64,
    author_id: i64,
) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(
        r"
        select
            q.id,
            q.entry_sheet_id,
            q.question,
            q.answer,
            q.char_num
        from
            question q
            join entry_sheet es on es.id = q.entry_sheet_id
        where
            q.id = $1 and
            es.author_id = $2
        ",
    )
    .bind(id)
    .bind(author_id)
    .fetch_optional(pool)
    .await
}

/// Questions written by `author_id` sharing at least one tag with `question_id`.
pub async fn get_related_questions(
    pool: &PgPool,
    question_id: i64,
    author_id: i64,
) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(
        r"
        select distinct
            q.id,
            q.entry_sheet_id,
            q.question,
            q.answer,
            q.char_num
        from
            question q
            join entry_sheet es on es.id = q.entry_sheet_id
            join question_tag qt on qt.question_id = q.id
        where
            es.author_id = $2 and
            q.id <> $1 and
            qt.tag_id in (
                select tag_id from question_tag where question_id = $1
            )
        order by q.id
        ",
    )
    .bind(question_id)
    .bind(author_id)
    .fetch_all(pool)
    .await
}

/// Saves the whole batch or nothing.
pub async fn update_answers(
    pool: &PgPool,
    entry_sheet_id: i64,
    answers: &[AnswerForm],
) -> Result<(), sqlx::Error> {
    let mut transaction = pool.begin().await?;

    for form in answers {
        sqlx::query(
            r"
            update question set
                answer = $1,
                char_num = $2
            where
                id = $3 and
                entry_sheet_id = $4
            ",
        )
        .bind(&form.answer)
        .bind(count_chars(&form.answer))
        .bind(form.question_id)
        .bind(entry_sheet_id)
        .execute(&mut *transaction)
        .await?;
    }

    transaction.commit().await
}
