table! {
    users (id) {
        id -> Int4,
        email -> Varchar,
        password -> Text,
        name -> Varchar,
        photo -> Nullable<Text>,
        timestamps -> Timestamptz,
    }
}

table! {
    roles (id) {
        id -> Int4,
        name -> Varchar,
    }
}

table! {
    statuses (id) {
        id -> Int4,
        name -> Varchar,
        color_code -> Varchar,
    }
}

table! {
    boards (id) {
        id -> Int4,
        name -> Varchar,
    }
}

table! {
    board_user_roles (board_id, user_id, role_id) {
        board_id -> Int4,
        user_id -> Int4,
        role_id -> Int4,
    }
}

table! {
    columns (id) {
        id -> Int4,
        name -> Varchar,
        column_number -> Int4,
        board_id -> Int4,
    }
}

table! {
    tasks (id) {
        id -> Int4,
        name -> Varchar,
        description -> Nullable<Text>,
        deadline -> Timestamptz,
        owner_id -> Int4,
        column_id -> Int4,
        status_id -> Int4,
        recepient_id -> Nullable<Int4>,
        photos -> Array<Text>,
        timestamps -> Timestamptz,
    }
}

table! {
    comments (id) {
        id -> Int4,
        content -> Text,
        task_id -> Int4,
        user_id -> Int4,
        answer_id -> Nullable<Int4>,
        #[sql_name = "type"]
        kind -> Nullable<Bool>,
    }
}

joinable!(board_user_roles -> boards (board_id));
joinable!(board_user_roles -> users (user_id));
joinable!(board_user_roles -> roles (role_id));
joinable!(columns -> boards (board_id));
joinable!(tasks -> columns (column_id));
joinable!(tasks -> statuses (status_id));
joinable!(comments -> tasks (task_id));

allow_tables_to_appear_in_same_query!(
    users,
    roles,
    statuses,
    boards,
    board_user_roles,
    columns,
    tasks,
    comments,
);
